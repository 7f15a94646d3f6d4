//! Lossless in-memory model of a TS document.
//!
//! The model mirrors the file: contexts keep their order, messages keep
//! their provenance, comments and status. Tooling (validation, statistics,
//! the writer) works on this tree; runtime lookups use the flattened
//! [`Catalog`](crate::catalog::Catalog) built from it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A whole TS document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Document {
    /// Format version attribute (`"2.1"` for current tooling).
    pub version: Option<String>,
    /// Target locale, e.g. `"de_DE"`.
    pub language: Option<String>,
    /// Locale of the source strings, when declared.
    pub source_language: Option<String>,
    pub contexts: Vec<Context>,
}

impl Document {
    /// An empty document for the given target language.
    #[must_use]
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            version: Some("2.1".to_string()),
            language: Some(language.into()),
            source_language: None,
            contexts: Vec::new(),
        }
    }

    /// Find a context by name.
    #[must_use]
    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// Mutable access to a context, creating it at the end if absent.
    pub fn context_mut(&mut self, name: &str) -> &mut Context {
        let idx = match self.contexts.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                self.contexts.push(Context::new(name));
                self.contexts.len() - 1
            }
        };
        &mut self.contexts[idx]
    }

    /// Iterate over every message together with its context name.
    pub fn messages(&self) -> impl Iterator<Item = (&str, &Message)> {
        self.contexts
            .iter()
            .flat_map(|c| c.messages.iter().map(move |m| (c.name.as_str(), m)))
    }

    /// Total number of messages across all contexts.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(|c| c.messages.len()).sum()
    }
}

/// A named group of messages, usually one UI class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Context {
    pub name: String,
    pub comment: Option<String>,
    pub messages: Vec<Message>,
}

impl Context {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Find the first message with this source text and no disambiguation.
    #[must_use]
    pub fn message(&self, source: &str) -> Option<&Message> {
        self.messages
            .iter()
            .find(|m| m.source == source && m.comment.is_none())
    }
}

/// One translatable string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Message {
    pub id: Option<String>,
    /// Where the string occurs in the application sources.
    pub locations: Vec<Location>,
    pub source: String,
    /// Previous source text kept while translators catch up.
    pub old_source: Option<String>,
    /// Disambiguation; part of the lookup key.
    pub comment: Option<String>,
    pub old_comment: Option<String>,
    /// Note from the developer to translators.
    pub extra_comment: Option<String>,
    pub translator_comment: Option<String>,
    pub translation: Translation,
    pub status: TranslationStatus,
}

impl Message {
    /// A finished, singular message.
    #[must_use]
    pub fn new(source: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            translation: Translation::Text(translation.into()),
            ..Self::default()
        }
    }

    /// A message awaiting translation.
    #[must_use]
    pub fn unfinished(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            status: TranslationStatus::Unfinished,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_location(mut self, filename: impl Into<String>, line: u32) -> Self {
        self.locations.push(Location {
            filename: Some(filename.into()),
            line: Some(LineRef::Absolute(line)),
        });
        self
    }

    #[must_use]
    pub fn with_old_source(mut self, old: impl Into<String>) -> Self {
        self.old_source = Some(old.into());
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    #[must_use]
    pub fn is_numerus(&self) -> bool {
        matches!(self.translation, Translation::Numerus(_))
    }

    /// Whether any translated text is present.
    #[must_use]
    pub fn has_translation(&self) -> bool {
        match &self.translation {
            Translation::Text(text) => !text.is_empty(),
            Translation::Numerus(forms) => forms.iter().any(|f| !f.is_empty()),
        }
    }

    /// The disambiguation comment, or `""` when absent.
    #[must_use]
    pub fn disambiguation(&self) -> &str {
        self.comment.as_deref().unwrap_or("")
    }
}

/// Translated text of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Translation {
    /// A single string; empty when untranslated.
    Text(String),
    /// Plural forms, ordered as the target language's plural rule expects.
    Numerus(Vec<String>),
}

impl Default for Translation {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// The `type` attribute of `<translation>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TranslationStatus {
    #[default]
    Finished,
    Unfinished,
    /// The source string no longer exists upstream.
    Vanished,
    /// Legacy marker for strings removed upstream.
    Obsolete,
}

impl TranslationStatus {
    /// Attribute value, `None` for finished translations.
    #[must_use]
    pub fn as_attr(self) -> Option<&'static str> {
        match self {
            Self::Finished => None,
            Self::Unfinished => Some("unfinished"),
            Self::Vanished => Some("vanished"),
            Self::Obsolete => Some("obsolete"),
        }
    }

    /// Parse the attribute value; unknown values read as finished.
    #[must_use]
    pub fn from_attr(value: &str) -> Self {
        match value {
            "unfinished" => Self::Unfinished,
            "vanished" => Self::Vanished,
            "obsolete" => Self::Obsolete,
            _ => Self::Finished,
        }
    }

    /// Vanished and obsolete entries are kept for translators only.
    #[must_use]
    pub fn is_retired(self) -> bool {
        matches!(self, Self::Vanished | Self::Obsolete)
    }
}

/// Provenance of a message in the application sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    /// Omitted when it repeats the previous location's file.
    pub filename: Option<String>,
    pub line: Option<LineRef>,
}

/// A `line` attribute: absolute, or relative to the previous location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LineRef {
    Absolute(u32),
    Relative(i32),
}

impl LineRef {
    /// Parse `"467"`, `"+3"` or `"-2"`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.starts_with('+') || value.starts_with('-') {
            value.parse().ok().map(Self::Relative)
        } else {
            value.parse().ok().map(Self::Absolute)
        }
    }
}

impl std::fmt::Display for LineRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absolute(n) => write!(f, "{n}"),
            Self::Relative(n) => write!(f, "{n:+}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_refs_keep_their_sign() {
        assert_eq!(LineRef::parse("467"), Some(LineRef::Absolute(467)));
        assert_eq!(LineRef::parse("+3"), Some(LineRef::Relative(3)));
        assert_eq!(LineRef::parse("-12"), Some(LineRef::Relative(-12)));
        assert_eq!(LineRef::parse("abc"), None);
        assert_eq!(LineRef::Relative(3).to_string(), "+3");
        assert_eq!(LineRef::Relative(-2).to_string(), "-2");
        assert_eq!(LineRef::Absolute(9).to_string(), "9");
    }

    #[test]
    fn status_attribute_mapping() {
        for status in [
            TranslationStatus::Finished,
            TranslationStatus::Unfinished,
            TranslationStatus::Vanished,
            TranslationStatus::Obsolete,
        ] {
            let parsed = status
                .as_attr()
                .map_or(TranslationStatus::Finished, TranslationStatus::from_attr);
            assert_eq!(parsed, status);
        }
        assert!(TranslationStatus::Vanished.is_retired());
        assert!(!TranslationStatus::Unfinished.is_retired());
    }

    #[test]
    fn has_translation_ignores_empty_forms() {
        assert!(!Message::unfinished("Log").has_translation());
        assert!(Message::new("Log", "Protokoll").has_translation());

        let mut numerus = Message::unfinished("%n file(s)");
        numerus.translation = Translation::Numerus(vec![String::new(), String::new()]);
        assert!(!numerus.has_translation());
        numerus.translation = Translation::Numerus(vec!["%n Datei".into(), String::new()]);
        assert!(numerus.has_translation());
        assert!(numerus.is_numerus());
    }

    #[test]
    fn context_mut_creates_once() {
        let mut doc = Document::new("de_DE");
        doc.context_mut("MainWindow")
            .messages
            .push(Message::new("Exit", "Beenden"));
        doc.context_mut("MainWindow")
            .messages
            .push(Message::new("Log", "Protokoll"));
        assert_eq!(doc.contexts.len(), 1);
        assert_eq!(doc.message_count(), 2);
        assert_eq!(
            doc.context("MainWindow")
                .and_then(|c| c.message("Exit"))
                .map(|m| &m.translation),
            Some(&Translation::Text("Beenden".into()))
        );
    }
}
