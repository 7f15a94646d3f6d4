//! Locale tags, fallback chains and catalog file discovery.
//!
//! Tags follow the POSIX shape used by TS files and the environment
//! (`de_DE`, `de_DE.UTF-8`, `sr_RS@latin`); BCP 47 hyphens are accepted.
//! Lookups try the most specific tag first, then the bare language.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A parsed locale: language plus optional region.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Locale {
    language: String,
    region: Option<String>,
}

impl Locale {
    /// Parse a locale tag. Returns `None` for empty, `C` and `POSIX`.
    ///
    /// ```
    /// use tscat::locale::Locale;
    ///
    /// let locale = Locale::parse("de_DE.UTF-8").unwrap();
    /// assert_eq!(locale.to_string(), "de_DE");
    /// assert_eq!(locale.fallback_chain(), vec!["de_DE", "de"]);
    /// assert!(Locale::parse("C").is_none());
    /// ```
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        // Drop codeset and modifier.
        let tag = tag.split(['.', '@']).next().unwrap_or("");
        if tag.is_empty() || tag == "C" || tag == "POSIX" {
            return None;
        }
        let mut parts = tag.split(['_', '-']);
        let language = parts.next()?.to_ascii_lowercase();
        if language.is_empty() || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        let region = parts
            .next()
            .filter(|r| !r.is_empty())
            .map(str::to_ascii_uppercase);
        Some(Self { language, region })
    }

    /// Read the message locale from the environment.
    ///
    /// `LC_ALL` wins over `LC_MESSAGES`, which wins over `LANG`. The
    /// lookup is injected so callers and tests avoid touching process state.
    pub fn from_env<F>(get_env: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|key| get_env(*key))
            .find(|value| !value.trim().is_empty())
            .and_then(|value| Self::parse(&value))
    }

    /// Locale of the current process environment.
    #[must_use]
    pub fn system() -> Option<Self> {
        Self::from_env(|key| std::env::var(key).ok())
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Tags to try, most specific first: `["de_DE", "de"]`.
    #[must_use]
    pub fn fallback_chain(&self) -> Vec<String> {
        let mut chain = Vec::with_capacity(2);
        if self.region.is_some() {
            chain.push(self.to_string());
        }
        chain.push(self.language.clone());
        chain
    }

    /// Whether a catalog declared for `tag` can serve this locale.
    #[must_use]
    pub fn accepts(&self, tag: &str) -> bool {
        match Self::parse(tag) {
            Some(other) => {
                other.language == self.language
                    && (other.region.is_none() || other.region == self.region)
            }
            None => false,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{}_{region}", self.language),
            None => f.write_str(&self.language),
        }
    }
}

/// Catalog file names to try for `base` in `locale`, most specific first.
///
/// `catalog_candidates("sonic-pi", de_DE)` yields `sonic-pi_de_DE.ts`
/// then `sonic-pi_de.ts`.
#[must_use]
pub fn catalog_candidates(base: &str, locale: &Locale) -> Vec<String> {
    locale
        .fallback_chain()
        .into_iter()
        .map(|tag| format!("{base}_{tag}.ts"))
        .collect()
}
