//! Consistency checks over a TS document.
//!
//! Errors are problems a running application would show to users
//! (broken placeholders, ambiguous keys). Warnings are the phrase checks
//! translators usually want to look at (accelerators, ending punctuation,
//! numerus form counts).

use std::collections::HashSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::model::{Document, Message, Translation};
use crate::placeholder::{has_count_marker, markers};
use crate::plural::PluralRule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Severity {
    Warning,
    Error,
}

/// What is wrong with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IssueKind {
    /// `%N` markers in the translation differ from the source.
    PlaceholderMismatch { missing: Vec<u8>, unexpected: Vec<u8> },
    /// The same (source, disambiguation) appears twice in one context.
    DuplicateMessage,
    /// Numerus translation has a different number of forms than the
    /// language's plural rule expects.
    NumerusFormCount { expected: usize, found: usize },
    /// A numerus form lacks the `%n` count marker the source has.
    MissingCountMarker { form: usize },
    /// Source and translation disagree on having a `&` accelerator.
    AcceleratorMismatch,
    /// Source and translation end with different punctuation.
    PunctuationMismatch { source: String, translation: String },
}

impl IssueKind {
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::PlaceholderMismatch { .. } | Self::DuplicateMessage => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlaceholderMismatch {
                missing,
                unexpected,
            } => {
                write!(f, "placeholder mismatch")?;
                if !missing.is_empty() {
                    write!(f, "; missing {}", join_markers(missing))?;
                }
                if !unexpected.is_empty() {
                    write!(f, "; unexpected {}", join_markers(unexpected))?;
                }
                Ok(())
            }
            Self::DuplicateMessage => write!(f, "duplicate message"),
            Self::NumerusFormCount { expected, found } => {
                write!(f, "expected {expected} numerus forms, found {found}")
            }
            Self::MissingCountMarker { form } => {
                write!(f, "numerus form {} lacks %n", form + 1)
            }
            Self::AcceleratorMismatch => write!(f, "accelerator mismatch"),
            Self::PunctuationMismatch {
                source,
                translation,
            } => write!(
                f,
                "ending punctuation differs ('{source}' vs '{translation}')"
            ),
        }
    }
}

fn join_markers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("%{n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A finding about one message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Issue {
    pub context: String,
    pub source: String,
    pub kind: IssueKind,
}

impl Issue {
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity() {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(
            f,
            "{label}: {}: {:?}: {}",
            self.context, self.source, self.kind
        )
    }
}

/// Check every live message of `doc`.
///
/// Untranslated and retired messages are only checked for duplicates.
#[must_use]
pub fn validate(doc: &Document) -> Vec<Issue> {
    let rule = doc
        .language
        .as_deref()
        .map(PluralRule::for_language)
        .unwrap_or_default();
    let mut issues = Vec::new();

    for context in &doc.contexts {
        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        for message in &context.messages {
            let mut push = |kind| {
                issues.push(Issue {
                    context: context.name.clone(),
                    source: message.source.clone(),
                    kind,
                });
            };
            if message.status.is_retired() {
                continue;
            }
            if !seen.insert((message.source.as_str(), message.disambiguation())) {
                push(IssueKind::DuplicateMessage);
            }
            if !message.has_translation() {
                continue;
            }
            for kind in check_message(message, rule) {
                push(kind);
            }
        }
    }
    issues
}

fn check_message(message: &Message, rule: PluralRule) -> Vec<IssueKind> {
    let mut kinds = Vec::new();
    let texts: Vec<&str> = match &message.translation {
        Translation::Text(text) => vec![text.as_str()],
        Translation::Numerus(forms) => {
            if forms.len() != rule.form_count() {
                kinds.push(IssueKind::NumerusFormCount {
                    expected: rule.form_count(),
                    found: forms.len(),
                });
            }
            if has_count_marker(&message.source) {
                for (form, text) in forms.iter().enumerate() {
                    if !text.is_empty() && !has_count_marker(text) {
                        kinds.push(IssueKind::MissingCountMarker { form });
                    }
                }
            }
            forms
                .iter()
                .map(String::as_str)
                .filter(|f| !f.is_empty())
                .collect()
        }
    };

    let expected = markers(&message.source);
    let mut mismatch_reported = false;
    for text in &texts {
        let found = markers(text);
        if found != expected && !mismatch_reported {
            kinds.push(IssueKind::PlaceholderMismatch {
                missing: expected.difference(&found).copied().collect(),
                unexpected: found.difference(&expected).copied().collect(),
            });
            mismatch_reported = true;
        }
    }

    if let Some(text) = texts.first() {
        if has_accelerator(&message.source) != has_accelerator(text) {
            kinds.push(IssueKind::AcceleratorMismatch);
        }
        let source_end = ending_punctuation(&message.source);
        let text_end = ending_punctuation(text);
        if source_end != text_end {
            kinds.push(IssueKind::PunctuationMismatch {
                source: source_end.to_string(),
                translation: text_end.to_string(),
            });
        }
    }
    kinds
}

/// A single `&` before a non-space character marks a mnemonic; `&&` is a
/// literal ampersand.
fn has_accelerator(text: &str) -> bool {
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            continue;
        }
        match chars.peek() {
            Some('&') => {
                chars.next();
            }
            Some(next) if !next.is_whitespace() => return true,
            _ => {}
        }
    }
    false
}

/// Trailing sentence punctuation, with `...` and `…` treated alike.
fn ending_punctuation(text: &str) -> &'static str {
    let trimmed = text.trim_end();
    if trimmed.ends_with("...") || trimmed.ends_with('…') {
        return "…";
    }
    match trimmed.chars().last() {
        Some('.') => ".",
        Some(':') => ":",
        Some('?' | '？') => "?",
        Some('!' | '！') => "!",
        Some('。') => ".",
        _ => "",
    }
}
