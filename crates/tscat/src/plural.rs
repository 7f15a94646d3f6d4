//! Numerus form selection.
//!
//! A numerus message carries one translation per plural form of the target
//! language, in a fixed order. [`PluralRule`] maps a count to the index of
//! the form to use.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Plural rule families.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PluralRule {
    /// No plural distinction (Japanese, Chinese, Korean, ...).
    Single,
    /// `n == 1` singular, everything else plural (English, German, ...).
    #[default]
    OneOther,
    /// `n <= 1` singular (French, Brazilian Portuguese).
    French,
    /// One / 2..=4 / other (Czech, Slovak).
    CzechSlovak,
    /// One / few by last digit / many (Polish).
    Polish,
    /// One / few / many by last digits (Russian, Ukrainian, ...).
    EastSlavic,
    /// Zero / one / two / few / many / other (Arabic).
    Arabic,
}

impl PluralRule {
    /// Detect the rule from a locale tag such as `"de_DE"` or `"pt-BR"`.
    #[must_use]
    pub fn for_language(tag: &str) -> Self {
        let lower = tag.trim().to_ascii_lowercase().replace('-', "_");
        let lang = lower.split('_').next().unwrap_or("");
        match lang {
            "ja" | "zh" | "ko" | "vi" | "th" | "id" | "ms" | "lo" | "my" => Self::Single,
            "fr" | "ff" | "fil" | "tl" => Self::French,
            "pt" if lower.starts_with("pt_br") => Self::French,
            "cs" | "sk" => Self::CzechSlovak,
            "pl" => Self::Polish,
            "ru" | "uk" | "be" | "sr" | "hr" | "bs" => Self::EastSlavic,
            "ar" => Self::Arabic,
            _ => Self::OneOther,
        }
    }

    /// Number of numerus forms a translation should provide.
    #[must_use]
    pub fn form_count(self) -> usize {
        match self {
            Self::Single => 1,
            Self::OneOther | Self::French => 2,
            Self::CzechSlovak | Self::Polish | Self::EastSlavic => 3,
            Self::Arabic => 6,
        }
    }

    /// Index of the form to use for `count`.
    #[must_use]
    pub fn form_index(self, count: i64) -> usize {
        let n = count.unsigned_abs();
        let n10 = n % 10;
        let n100 = n % 100;
        match self {
            Self::Single => 0,
            Self::OneOther => usize::from(n != 1),
            Self::French => usize::from(n > 1),
            Self::CzechSlovak => match n {
                1 => 0,
                2..=4 => 1,
                _ => 2,
            },
            Self::Polish => {
                if n == 1 {
                    0
                } else if (2..=4).contains(&n10) && !(12..=14).contains(&n100) {
                    1
                } else {
                    2
                }
            }
            Self::EastSlavic => {
                if n10 == 1 && n100 != 11 {
                    0
                } else if (2..=4).contains(&n10) && !(12..=14).contains(&n100) {
                    1
                } else {
                    2
                }
            }
            Self::Arabic => match n {
                0 => 0,
                1 => 1,
                2 => 2,
                _ if (3..=10).contains(&n100) => 3,
                _ if n100 >= 11 => 4,
                _ => 5,
            },
        }
    }

    /// Select a form from `forms`, clamping to the last one provided.
    #[must_use]
    pub fn select(self, forms: &[String], count: i64) -> Option<&str> {
        let idx = self.form_index(count).min(forms.len().checked_sub(1)?);
        forms.get(idx).map(String::as_str)
    }
}
