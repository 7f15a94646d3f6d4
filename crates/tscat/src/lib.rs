#![forbid(unsafe_code)]

//! Qt Linguist (`.ts`) translation catalogs.
//!
//! Parses and writes TS documents, serves translations by
//! (context, source text) with the source text as fallback, substitutes
//! `%1`..`%99` and `%n` markers, and checks catalogs for the mistakes
//! translators commonly make.

pub mod catalog;
pub mod error;
pub mod global;
pub mod locale;
pub mod model;
pub mod placeholder;
pub mod plural;
pub mod reader;
pub mod report;
pub mod translator;
pub mod validate;
pub mod writer;

pub use catalog::{Catalog, LoadOptions};
pub use error::TsError;
pub use locale::Locale;
pub use model::{
    Context, Document, LineRef, Location, Message, Translation, TranslationStatus,
};
pub use plural::PluralRule;
pub use reader::{ParseMode, Parsed, parse_document, parse_str, read_file};
pub use report::DocumentStats;
pub use translator::{CoverageReport, LocaleCoverage, Translator};
pub use validate::{Issue, IssueKind, Severity, validate};
pub use writer::{write_document, write_file};
