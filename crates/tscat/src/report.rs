//! Translation statistics for a document.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::model::{Document, TranslationStatus};

/// Message counts by translation state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DocumentStats {
    pub contexts: usize,
    /// Translated and not marked unfinished.
    pub finished: usize,
    /// Translated but still marked unfinished.
    pub unfinished: usize,
    /// No translation text yet.
    pub untranslated: usize,
    /// Vanished or obsolete.
    pub retired: usize,
}

impl DocumentStats {
    #[must_use]
    pub fn of(doc: &Document) -> Self {
        let mut stats = Self {
            contexts: doc.contexts.len(),
            ..Self::default()
        };
        for (_, message) in doc.messages() {
            if message.status.is_retired() {
                stats.retired += 1;
            } else if !message.has_translation() {
                stats.untranslated += 1;
            } else if message.status == TranslationStatus::Unfinished {
                stats.unfinished += 1;
            } else {
                stats.finished += 1;
            }
        }
        stats
    }

    /// Messages a catalog built with default options would serve.
    #[must_use]
    pub fn translated(&self) -> usize {
        self.finished + self.unfinished
    }

    /// Live messages, translated or not.
    #[must_use]
    pub fn live(&self) -> usize {
        self.translated() + self.untranslated
    }

    /// Share of live messages that are translated, 0.0–100.0.
    #[must_use]
    pub fn completion_percent(&self) -> f32 {
        if self.live() == 0 {
            100.0
        } else {
            (self.translated() as f32 / self.live() as f32) * 100.0
        }
    }
}

/// `lrelease`-style summary lines.
impl fmt::Display for DocumentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Generated {} translation(s) ({} finished and {} unfinished)",
            self.translated(),
            self.finished,
            self.unfinished
        )?;
        if self.untranslated > 0 {
            write!(
                f,
                "\nIgnored {} untranslated source text(s)",
                self.untranslated
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Message;

    #[test]
    fn counts_each_state_once() {
        let mut doc = Document::new("de_DE");
        let main = doc.context_mut("MainWindow");
        main.messages.push(Message::new("Exit", "Beenden"));
        main.messages.push(Message::new("Log", "Protokoll"));
        main.messages.push(Message::unfinished("Enable Audio Inputs"));
        let mut review = Message::new("Cues", "Cues");
        review.status = TranslationStatus::Unfinished;
        main.messages.push(review);
        let mut gone = Message::new("Old", "Alt");
        gone.status = TranslationStatus::Obsolete;
        doc.context_mut("QObject").messages.push(gone);

        let stats = DocumentStats::of(&doc);
        assert_eq!(
            stats,
            DocumentStats {
                contexts: 2,
                finished: 2,
                unfinished: 1,
                untranslated: 1,
                retired: 1,
            }
        );
        assert_eq!(stats.live(), 4);
        assert!((stats.completion_percent() - 75.0).abs() < f32::EPSILON);
        assert_eq!(
            stats.to_string(),
            "Generated 3 translation(s) (2 finished and 1 unfinished)\nIgnored 1 untranslated source text(s)"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_flat_counts() {
        let stats = DocumentStats {
            contexts: 1,
            finished: 4,
            ..DocumentStats::default()
        };
        let json = serde_json::to_value(stats).expect("serialize");
        assert_eq!(json["finished"], 4);
        assert_eq!(json["untranslated"], 0);
    }

    #[test]
    fn empty_document_is_complete() {
        let stats = DocumentStats::of(&Document::default());
        assert_eq!(stats.live(), 0);
        assert!((stats.completion_percent() - 100.0).abs() < f32::EPSILON);
        assert_eq!(
            stats.to_string(),
            "Generated 0 translation(s) (0 finished and 0 unfinished)"
        );
    }
}
