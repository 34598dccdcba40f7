//! # Document Fetcher
//!
//! Downloads a PDF (or reads it from disk) and returns its text page by page.

use super::{AdapterError, DocumentFetcher, USER_AGENT, check_status};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;
use verisift_core::VerisiftError;

/// Largest document body accepted, in bytes.
const MAX_DOCUMENT_BYTES: usize = 32 * 1024 * 1024;

/// `DocumentFetcher` backed by `reqwest` and `pdf-extract`.
///
/// Locators starting with `http://` or `https://` are downloaded; anything
/// else is treated as a local path.
pub struct HttpPdfFetcher {
    http: reqwest::Client,
    max_bytes: usize,
}

impl HttpPdfFetcher {
    pub fn new(timeout: Duration) -> Result<Self, VerisiftError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| VerisiftError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            max_bytes: MAX_DOCUMENT_BYTES,
        })
    }

    /// Override the download size cap.
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    async fn load_bytes(&self, locator: &str) -> Result<Vec<u8>, AdapterError> {
        if locator.starts_with("http://") || locator.starts_with("https://") {
            let resp = self.http.get(locator).send().await?;
            let resp = check_status(resp).await?;
            read_capped(resp, self.max_bytes).await
        } else {
            tokio::fs::read(locator)
                .await
                .map_err(|e| AdapterError::Unavailable(format!("cannot read '{locator}': {e}")))
        }
    }

    async fn try_fetch(&self, locator: &str) -> Result<BTreeMap<u32, String>, AdapterError> {
        let bytes = self.load_bytes(locator).await?;

        // Parsing is CPU-bound and may panic on hostile input.
        let pages = tokio::task::spawn_blocking(move || extract_pages(&bytes))
            .await
            .map_err(|e| AdapterError::Malformed(format!("PDF parser aborted: {e}")))??;
        Ok(pages)
    }
}

/// Read a response body, giving up as soon as it exceeds `max_bytes`.
async fn read_capped(
    mut resp: reqwest::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, AdapterError> {
    let too_large = |len: u64| {
        AdapterError::Malformed(format!(
            "document of {len} bytes exceeds {max_bytes} byte limit"
        ))
    };

    if let Some(declared) = resp.content_length() {
        if declared > max_bytes as u64 {
            return Err(too_large(declared));
        }
    }

    let mut body = Vec::new();
    while let Some(chunk) = resp.chunk().await? {
        if body.len() + chunk.len() > max_bytes {
            return Err(too_large((body.len() + chunk.len()) as u64));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Page texts keyed by 1-based page number.
pub(crate) fn extract_pages(bytes: &[u8]) -> Result<BTreeMap<u32, String>, AdapterError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| AdapterError::Malformed(e.to_string()))?;
    Ok((1u32..).zip(pages).collect())
}

#[async_trait]
impl DocumentFetcher for HttpPdfFetcher {
    async fn fetch(&self, locator: &str) -> BTreeMap<u32, String> {
        match self.try_fetch(locator).await {
            Ok(pages) => {
                tracing::debug!(locator, pages = pages.len(), "Document parsed");
                pages
            }
            Err(e) => {
                tracing::warn!(locator, error = %e, "Document fetch failed");
                BTreeMap::new()
            }
        }
    }
}
