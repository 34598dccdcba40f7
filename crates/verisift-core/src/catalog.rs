//! # Document Catalog
//!
//! The curated set of official documents a verification query is checked
//! against, plus the static list of sources suggested when nothing matches.
//!
//! The catalog is read-only once built. Candidate selection is a pure
//! function of the query and the catalog, in catalog order.

use serde::{Deserialize, Serialize};

/// One curated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    /// URL (or path) of the document.
    pub locator: String,
    /// Declared topic tags, matched against the lower-cased query.
    pub keywords: Vec<String>,
}

impl CatalogEntry {
    pub fn new(
        title: impl Into<String>,
        locator: impl Into<String>,
        keywords: &[&str],
    ) -> Self {
        Self {
            title: title.into(),
            locator: locator.into(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// True when any tag occurs as a substring of `lowered_query`.
    #[must_use]
    pub fn matches(&self, lowered_query: &str) -> bool {
        self.keywords
            .iter()
            .any(|tag| lowered_query.contains(tag.to_lowercase().as_str()))
    }

    /// True when the locator denotes a document that can be parsed page by
    /// page. Web pages are only ever suggested, never parsed.
    #[must_use]
    pub fn is_parseable_document(&self) -> bool {
        let path = self
            .locator
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        path.to_ascii_lowercase().ends_with(".pdf")
    }
}

/// The catalog and its fallback suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCatalog {
    entries: Vec<CatalogEntry>,
    suggested_sources: Vec<String>,
}

impl DocumentCatalog {
    #[must_use]
    pub fn new(entries: Vec<CatalogEntry>, suggested_sources: Vec<String>) -> Self {
        Self {
            entries,
            suggested_sources,
        }
    }

    /// The built-in catalog of official fact-check material.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(
            vec![
                CatalogEntry::new(
                    "PIB Fact Check on Fake News Schemes",
                    "https://pib.gov.in/FactCheck/guide_english.pdf",
                    &["scheme", "free", "laptop", "government", "fake"],
                ),
                CatalogEntry::new(
                    "WHO Q&A on COVID-19 and related topics",
                    "https://www.who.int/emergencies/diseases/novel-coronavirus-2019/question-and-answers-hub/q-a-detail/coronavirus-disease-(covid-19)",
                    &["covid", "vaccine", "mask", "virus"],
                ),
            ],
            builtin_suggested_sources(),
        )
    }

    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn suggested_sources(&self) -> &[String] {
        &self.suggested_sources
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose tags occur in the query, in catalog order.
    #[must_use]
    pub fn candidates(&self, query: &str) -> Vec<&CatalogEntry> {
        let lowered = query.to_lowercase();
        self.entries.iter().filter(|e| e.matches(&lowered)).collect()
    }
}

impl Default for DocumentCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Official portals suggested when no catalog document yields an excerpt.
#[must_use]
pub fn builtin_suggested_sources() -> Vec<String> {
    vec![
        "https://pib.gov.in/factcheck.aspx".to_string(),
        "https://www.india.gov.in/my-government/schemes".to_string(),
        "https://www.who.int/emergencies/diseases/novel-coronavirus-2019/advice-for-public"
            .to_string(),
    ]
}
