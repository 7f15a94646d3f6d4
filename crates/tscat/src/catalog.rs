//! Immutable translation catalog with source-text fallback.
//!
//! # Invariants
//!
//! 1. **Lookups never fail**: every query returns either a served
//!    translation or the source text, with placeholders substituted the
//!    same way in both cases.
//!
//! 2. **Only real translations are served**: empty translations, retired
//!    (vanished/obsolete) entries and, by default, translations whose
//!    placeholder markers differ from the source are never returned.
//!
//! 3. **First entry wins**: a repeated (context, source, disambiguation)
//!    key keeps its first translation.
//!
//! 4. **Thread safety**: `Catalog` is `Send + Sync`; all data is immutable
//!    after construction.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing key | Not in the catalog | Source text returned |
//! | Unfinished entry | Empty translation | Source text returned |
//! | Malformed document | Bad XML, wrong root | `load`: warning, empty catalog |
//! | Bad message | No `<source>`, bad text | Warning, entry skipped |
//! | Missing file | I/O error | `load`: warning, empty catalog |

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, info_span, warn};

use crate::error::TsError;
use crate::model::{Document, Message, Translation, TranslationStatus};
use crate::placeholder::{markers, replace_count, substitute};
use crate::plural::PluralRule;
use crate::reader::{self, ParseMode};

/// Controls which entries of a document a catalog serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Serve non-empty translations that are still marked unfinished.
    pub include_unfinished: bool,
    /// Drop translations whose `%1`..`%99` markers differ from the source.
    pub reject_placeholder_mismatch: bool,
    /// Also answer requests made with an entry's previous source text.
    pub match_old_source: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            include_unfinished: true,
            reject_placeholder_mismatch: true,
            match_old_source: false,
        }
    }
}

#[derive(Debug, Clone)]
enum Served {
    Text(String),
    Numerus(Vec<String>),
}

#[derive(Debug, Clone)]
struct Variant {
    disambiguation: String,
    served: Served,
}

/// Source text to variants, within one context.
type ContextTable = HashMap<String, Vec<Variant>>;

/// Lookup table built from a TS document.
///
/// # Example
///
/// ```
/// use tscat::catalog::Catalog;
///
/// let catalog: Catalog = r#"<TS version="2.1" language="de_DE">
///   <context><name>MainWindow</name>
///     <message><source>Exit</source><translation>Beenden</translation></message>
///     <message><source>Line: %1,  Position: %2</source>
///              <translation>Zeile: %1, Position: %2</translation></message>
///   </context>
/// </TS>"#.parse().unwrap();
///
/// assert_eq!(catalog.lookup("MainWindow", "Exit", &[] as &[&str]), "Beenden");
/// assert_eq!(
///     catalog.lookup("MainWindow", "Line: %1,  Position: %2", &["4", "10"]),
///     "Zeile: 4, Position: 10"
/// );
/// assert_eq!(catalog.lookup("MainWindow", "Quit", &[] as &[&str]), "Quit");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    language: Option<String>,
    plural: PluralRule,
    contexts: HashMap<String, ContextTable>,
    len: usize,
}

impl Catalog {
    /// A catalog that answers every lookup with the source text.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from a parsed document.
    #[must_use]
    pub fn from_document(doc: &Document, options: &LoadOptions) -> Self {
        let language = doc.language.clone();
        let plural = language
            .as_deref()
            .map(PluralRule::for_language)
            .unwrap_or_default();
        let mut catalog = Self {
            language,
            plural,
            contexts: HashMap::new(),
            len: 0,
        };

        let mut rejected = 0usize;
        for (context, message) in doc.messages() {
            let Some(served) = servable(context, message, options) else {
                if message.has_translation() && !message.status.is_retired() {
                    rejected += 1;
                }
                continue;
            };
            catalog.insert(context, &message.source, message.disambiguation(), served.clone());
            if options.match_old_source
                && let Some(old) = &message.old_source
            {
                catalog.insert(context, old, message.disambiguation(), served);
            }
        }

        debug!(
            language = catalog.language.as_deref().unwrap_or(""),
            served = catalog.len,
            rejected,
            "built translation catalog"
        );
        catalog
    }

    fn insert(&mut self, context: &str, source: &str, disambiguation: &str, served: Served) {
        let variants = self
            .contexts
            .entry(context.to_string())
            .or_default()
            .entry(source.to_string())
            .or_default();
        if variants.iter().any(|v| v.disambiguation == disambiguation) {
            debug!(context, source, "duplicate message; keeping the first translation");
            return;
        }
        variants.push(Variant {
            disambiguation: disambiguation.to_string(),
            served,
        });
        self.len += 1;
    }

    /// Parse TS text, skipping unreadable messages.
    pub fn try_parse(input: &str, options: &LoadOptions) -> Result<Self, TsError> {
        let parsed = reader::parse_document(input, ParseMode::Lenient)?;
        Ok(Self::from_document(&parsed.document, options))
    }

    /// Parse TS text; a malformed document yields an empty catalog.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        Self::try_parse(input, &LoadOptions::default()).unwrap_or_else(|err| {
            warn!(error = %err, "unusable translation catalog; using source texts");
            Self::empty()
        })
    }

    /// Load a TS file, skipping unreadable messages.
    pub fn try_load(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self, TsError> {
        let path = path.as_ref();
        let _span = info_span!("catalog_load", path = %path.display()).entered();
        let parsed = reader::read_file(path, ParseMode::Lenient)?;
        Ok(Self::from_document(&parsed.document, options))
    }

    /// Load a TS file with default options.
    ///
    /// Never fails: an unreadable or malformed file is reported once at
    /// `warn` level and the returned catalog is empty, so the application
    /// keeps running in its source language.
    #[must_use]
    pub fn load(path: impl AsRef<Path>) -> Self {
        Self::load_with(path, &LoadOptions::default())
    }

    /// [`load`](Self::load) with explicit options.
    #[must_use]
    pub fn load_with(path: impl AsRef<Path>, options: &LoadOptions) -> Self {
        let path = path.as_ref();
        Self::try_load(path, options).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "unusable translation catalog; using source texts");
            Self::empty()
        })
    }

    /// Declared target language (`"de_DE"`), if any.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Plural rule derived from the declared language.
    #[must_use]
    pub fn plural_rule(&self) -> PluralRule {
        self.plural
    }

    /// Number of served (context, source, disambiguation) keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Context names, sorted.
    #[must_use]
    pub fn contexts(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.contexts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Every served (context, source) pair, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.contexts.iter().flat_map(|(context, table)| {
            table
                .keys()
                .map(move |source| (context.as_str(), source.as_str()))
        })
    }

    fn variant(&self, context: &str, source: &str, disambiguation: &str) -> Option<&Served> {
        let variants = self.contexts.get(context)?.get(source)?;
        variants
            .iter()
            .find(|v| v.disambiguation == disambiguation)
            .or_else(|| variants.iter().find(|v| v.disambiguation.is_empty()))
            .map(|v| &v.served)
    }

    /// Raw translation, `None` when the source text would be used.
    ///
    /// For numerus entries this is the first form.
    #[must_use]
    pub fn get(&self, context: &str, source: &str) -> Option<&str> {
        match self.variant(context, source, "")? {
            Served::Text(text) => Some(text.as_str()),
            Served::Numerus(forms) => forms.first().map(String::as_str).filter(|f| !f.is_empty()),
        }
    }

    /// Whether a translation is served for the pair.
    #[must_use]
    pub fn contains(&self, context: &str, source: &str) -> bool {
        self.get(context, source).is_some()
    }

    /// Translation or source text, without allocating.
    #[must_use]
    pub fn resolve<'a>(&'a self, context: &str, source: &'a str) -> &'a str {
        self.get(context, source).unwrap_or(source)
    }

    /// Translate and substitute `%1`..`%99` markers with `args`.
    #[must_use]
    pub fn lookup<S: AsRef<str>>(&self, context: &str, source: &str, args: &[S]) -> String {
        substitute(self.resolve(context, source), args)
    }

    /// The served text for a disambiguated, optionally counted request,
    /// `None` when this catalog has nothing to offer.
    ///
    /// With a count, the numerus form is chosen by the catalog's plural
    /// rule and `%n` is replaced. Without one, numerus entries answer with
    /// their first non-empty form.
    #[must_use]
    pub fn translation(
        &self,
        context: &str,
        source: &str,
        disambiguation: Option<&str>,
        count: Option<i64>,
    ) -> Option<String> {
        let text = match (self.variant(context, source, disambiguation.unwrap_or(""))?, count) {
            (Served::Text(text), _) => text.as_str(),
            (Served::Numerus(forms), Some(n)) => {
                self.plural.select(forms, n).filter(|f| !f.is_empty())?
            }
            (Served::Numerus(forms), None) => {
                forms.iter().map(String::as_str).find(|f| !f.is_empty())?
            }
        };
        Some(match count {
            Some(n) => replace_count(text, n),
            None => text.to_string(),
        })
    }

    /// Translate a message with optional disambiguation and count,
    /// falling back to the source text.
    #[must_use]
    pub fn translate(
        &self,
        context: &str,
        source: &str,
        disambiguation: Option<&str>,
        count: Option<i64>,
    ) -> String {
        self.translation(context, source, disambiguation, count)
            .unwrap_or_else(|| match count {
                Some(n) => replace_count(source, n),
                None => source.to_string(),
            })
    }

    /// Numerus lookup followed by `%1`..`%99` substitution.
    #[must_use]
    pub fn lookup_numerus<S: AsRef<str>>(
        &self,
        context: &str,
        source: &str,
        count: i64,
        args: &[S],
    ) -> String {
        substitute(&self.translate(context, source, None, Some(count)), args)
    }
}

impl FromStr for Catalog {
    type Err = TsError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::try_parse(input, &LoadOptions::default())
    }
}

/// The text a message contributes, or `None` when it must not be served.
fn servable(context: &str, message: &Message, options: &LoadOptions) -> Option<Served> {
    if message.status.is_retired() || !message.has_translation() {
        return None;
    }
    if message.status == TranslationStatus::Unfinished && !options.include_unfinished {
        return None;
    }
    let served = match &message.translation {
        Translation::Text(text) => Served::Text(text.clone()),
        Translation::Numerus(forms) => Served::Numerus(forms.clone()),
    };
    if options.reject_placeholder_mismatch && !placeholders_match(&message.source, &served) {
        warn!(
            context,
            source = %message.source,
            "translation placeholders differ from the source; using the source text"
        );
        return None;
    }
    Some(served)
}

fn placeholders_match(source: &str, served: &Served) -> bool {
    let expected = markers(source);
    match served {
        Served::Text(text) => markers(text) == expected,
        Served::Numerus(forms) => forms
            .iter()
            .filter(|f| !f.is_empty())
            .all(|f| markers(f) == expected),
    }
}
