//! Process-wide translator.
//!
//! Install one [`Translator`] at startup; afterwards any thread can call
//! [`tr`] or the [`tr!`](crate::tr) macro. Before installation every
//! lookup returns the source text.

use std::sync::OnceLock;

use crate::translator::Translator;

static TRANSLATOR: OnceLock<Translator> = OnceLock::new();

/// Install the process translator. Fails (returning it) if one is
/// already installed.
pub fn install(translator: Translator) -> Result<(), Translator> {
    TRANSLATOR.set(translator)
}

/// The installed translator, if any.
#[must_use]
pub fn translator() -> Option<&'static Translator> {
    TRANSLATOR.get()
}

/// Translate through the installed translator with source fallback.
#[must_use]
pub fn tr<S: AsRef<str>>(context: &str, source: &str, args: &[S]) -> String {
    match TRANSLATOR.get() {
        Some(translator) => translator.lookup(context, source, args),
        None => crate::placeholder::substitute(source, args),
    }
}

/// Translate through the process translator.
///
/// ```
/// let line = 4;
/// assert_eq!(
///     tscat::tr!("MainWindow", "Line: %1,  Position: %2", line, 10),
///     "Line: 4,  Position: 10"
/// );
/// assert_eq!(tscat::tr!("MainWindow", "Exit"), "Exit");
/// ```
#[macro_export]
macro_rules! tr {
    ($context:expr, $source:expr $(,)?) => {
        $crate::global::tr($context, $source, &[] as &[&str])
    };
    ($context:expr, $source:expr, $($arg:expr),+ $(,)?) => {
        $crate::global::tr(
            $context,
            $source,
            &[$(::std::string::ToString::to_string(&$arg)),+],
        )
    };
}
