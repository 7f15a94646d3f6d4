//! Errors raised while reading or writing translation catalogs.
//!
//! Lookups never produce errors: a missing translation falls back to the
//! source text. Errors only surface from the strict loading entry points
//! and from tooling.

use std::path::PathBuf;

/// Errors from catalog I/O and parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TsError {
    /// The catalog file could not be read or written.
    Io { path: PathBuf, message: String },
    /// The document is not well-formed XML.
    Xml { line: usize, message: String },
    /// The document root is not a `<TS>` element.
    NotTs { root: String },
    /// A single message could not be interpreted.
    InvalidEntry {
        context: String,
        line: usize,
        reason: String,
    },
}

impl TsError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Whether the error affects the whole document rather than one entry.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::InvalidEntry { .. })
    }
}

impl std::fmt::Display for TsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "{}: {message}", path.display()),
            Self::Xml { line, message } => write!(f, "malformed XML at line {line}: {message}"),
            Self::NotTs { root } => {
                write!(f, "expected a <TS> document root, found <{root}>")
            }
            Self::InvalidEntry {
                context,
                line,
                reason,
            } => write!(
                f,
                "invalid message in context '{context}' at line {line}: {reason}"
            ),
        }
    }
}

impl std::error::Error for TsError {}
