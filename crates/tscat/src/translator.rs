//! A stack of catalogs consulted in order.
//!
//! The most recently installed catalog is consulted first. Loading for a
//! locale installs the generic catalog (`app_de.ts`) below the regional one
//! (`app_de_AT.ts`), so regional strings override and everything else falls
//! through to the language catalog and finally to the source text.
//!
//! # Invariants
//!
//! 1. **Fallback chain terminates**: a lookup visits each catalog at most
//!    once and ends at the source text.
//! 2. **Order is explicit**: `catalogs()` lists catalogs in lookup order.

use std::path::Path;

use tracing::{debug, info};

use crate::catalog::{Catalog, LoadOptions};
use crate::locale::{Locale, catalog_candidates};
use crate::model::Document;
use crate::placeholder::{replace_count, substitute};

/// Ordered set of catalogs with source-text fallback.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    /// Lookup order: index 0 first.
    catalogs: Vec<Catalog>,
}

impl Translator {
    /// A translator with no catalogs; every lookup returns the source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a catalog in front of the existing ones.
    pub fn install(&mut self, catalog: Catalog) {
        self.catalogs.insert(0, catalog);
    }

    /// Builder form of [`install`](Self::install).
    #[must_use]
    pub fn with(mut self, catalog: Catalog) -> Self {
        self.install(catalog);
        self
    }

    /// Load `base_<tag>.ts` files from `dir` for every tag in the locale's
    /// fallback chain. Missing files are skipped; unusable ones install as
    /// empty catalogs.
    #[must_use]
    pub fn for_locale(
        dir: impl AsRef<Path>,
        base: &str,
        locale: &Locale,
        options: &LoadOptions,
    ) -> Self {
        let dir = dir.as_ref();
        let mut translator = Self::new();
        // Generic first so the regional catalog ends up in front.
        for name in catalog_candidates(base, locale).into_iter().rev() {
            let path = dir.join(&name);
            if !path.is_file() {
                debug!(path = %path.display(), "no catalog for locale tag");
                continue;
            }
            translator.install(Catalog::load_with(&path, options));
        }
        info!(
            locale = %locale,
            catalogs = translator.catalogs.len(),
            "translator ready"
        );
        translator
    }

    /// Installed catalogs in lookup order.
    #[must_use]
    pub fn catalogs(&self) -> &[Catalog] {
        &self.catalogs
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.catalogs.iter().all(Catalog::is_empty)
    }

    /// First served translation, `None` when the source would be used.
    #[must_use]
    pub fn get(&self, context: &str, source: &str) -> Option<&str> {
        self.catalogs.iter().find_map(|c| c.get(context, source))
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

    /// Disambiguated, optionally counted translation through the stack.
    #[must_use]
    pub fn translate(
        &self,
        context: &str,
        source: &str,
        disambiguation: Option<&str>,
        count: Option<i64>,
    ) -> String {
        self.catalogs
            .iter()
            .find_map(|c| c.translation(context, source, disambiguation, count))
            .unwrap_or_else(|| match count {
                Some(n) => replace_count(source, n),
                None => source.to_string(),
            })
    }

    /// Coverage of each installed catalog against a reference document,
    /// usually the untranslated template.
    ///
    /// Only the catalog itself counts; the stack's other members are not
    /// consulted, so each locale's own gaps show up.
    #[must_use]
    pub fn coverage_report(&self, reference: &Document) -> CoverageReport {
        let mut keys: Vec<(&str, &str)> = reference
            .messages()
            .filter(|(_, m)| !m.status.is_retired())
            .map(|(c, m)| (c, m.source.as_str()))
            .collect();
        keys.sort_unstable();
        keys.dedup();
        let total = keys.len();

        let locales = self
            .catalogs
            .iter()
            .map(|catalog| {
                let missing: Vec<String> = keys
                    .iter()
                    .filter(|(c, s)| !catalog.contains(c, s))
                    .map(|(c, s)| format!("{c}::{s}"))
                    .collect();
                let present = total.saturating_sub(missing.len());
                let coverage_percent = if total == 0 {
                    100.0
                } else {
                    (present as f32 / total as f32) * 100.0
                };
                LocaleCoverage {
                    locale: catalog.language().unwrap_or("").to_string(),
                    present,
                    missing,
                    coverage_percent,
                }
            })
            .collect();

        CoverageReport {
            total_keys: total,
            locales,
        }
    }
}

/// Coverage of installed catalogs against a reference key set.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverageReport {
    /// Number of distinct (context, source) keys in the reference.
    pub total_keys: usize,
    /// One entry per installed catalog, in lookup order.
    pub locales: Vec<LocaleCoverage>,
}

/// Per-catalog coverage statistics.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocaleCoverage {
    /// Declared language of the catalog (`""` when undeclared).
    pub locale: String,
    /// Reference keys the catalog translates.
    pub present: usize,
    /// Untranslated keys as `Context::source`, sorted.
    pub missing: Vec<String>,
    /// Coverage as a percentage (0.0–100.0).
    pub coverage_percent: f32,
}
