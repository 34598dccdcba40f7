//! # Document Verifier
//!
//! Looks for a passage addressing a query in the curated documents.
//!
//! ```text
//! Start → Filtering → { Fetching → Scoring }* → Found | Exhausted
//! ```
//!
//! Documents are visited in catalog order and pages in ascending order; the
//! first excerpt ends the search. A document that cannot be fetched or
//! parsed is skipped.

use super::orchestrator::run_contained;
use crate::adapters::DocumentFetcher;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use verisift_core::{
    CatalogEntry, Citation, DocumentCatalog, VerificationQuery, VerificationResult,
    VerisiftError, search_pages,
};

pub struct DocumentVerifier {
    catalog: Arc<DocumentCatalog>,
    fetcher: Arc<dyn DocumentFetcher>,
    timeout: Duration,
}

impl DocumentVerifier {
    pub fn new(
        catalog: Arc<DocumentCatalog>,
        fetcher: Arc<dyn DocumentFetcher>,
        timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            timeout,
        }
    }

    pub fn catalog(&self) -> &DocumentCatalog {
        &self.catalog
    }

    /// Validate `raw` and verify it. Only a too-short or too-long query is
    /// an error.
    pub async fn verify(&self, raw: &str) -> Result<VerificationResult, VerisiftError> {
        let query = VerificationQuery::parse(raw)?;
        Ok(self.verify_query(&query).await)
    }

    pub async fn verify_query(&self, query: &VerificationQuery) -> VerificationResult {
        let keywords = query.keywords();
        let candidates = self.catalog.candidates(query.as_str());
        tracing::debug!(
            candidates = candidates.len(),
            keywords = keywords.len(),
            "Filtered catalog"
        );

        for entry in candidates {
            if !entry.is_parseable_document() {
                tracing::debug!(title = %entry.title, "Skipping non-document locator");
                continue;
            }

            let pages = self.fetch(entry).await;
            if pages.is_empty() {
                continue;
            }

            if let Some(found) = search_pages(&pages, &keywords) {
                tracing::info!(title = %entry.title, page = found.page, "Excerpt found");
                return VerificationResult::found(
                    query,
                    Citation {
                        source: entry.title.clone(),
                        page: found.page,
                        excerpt: found.excerpt,
                    },
                );
            }
        }

        tracing::info!("No catalog document addressed the query");
        VerificationResult::exhausted(query, self.catalog.suggested_sources().to_vec())
    }

    async fn fetch(&self, entry: &CatalogEntry) -> BTreeMap<u32, String> {
        let fetcher = Arc::clone(&self.fetcher);
        let locator = entry.locator.clone();
        let call = async move { fetcher.fetch(&locator).await };

        match run_contained("document fetcher", self.timeout, call).await {
            Ok(pages) => pages,
            Err(reason) => {
                tracing::warn!(title = %entry.title, reason = %reason, "Document skipped");
                BTreeMap::new()
            }
        }
    }
}
