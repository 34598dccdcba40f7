//! # Adapters
//!
//! Capability interfaces for every external collaborator of the engine,
//! and their HTTP-backed implementations.
//!
//! - `Classifier` - fast local verdict (`classifier`)
//! - `FallbackAssessor` - language-model second opinion (`fallback`)
//! - `EvidenceProvider` - corroborating material (`providers`)
//! - `DocumentFetcher` - page-by-page document text (`documents`)
//! - `TextSource` - text producers: URL scraping (`article`) and OCR or
//!   speech recognition services (`transcriber`)
//!
//! Adapters are injected into the engine as `Arc<dyn _>`, so tests can
//! substitute fakes. Timeouts are imposed by the engine, not by adapters.

pub mod article;
pub mod classifier;
pub mod documents;
pub mod fallback;
pub mod providers;
pub mod transcriber;

pub use article::ArticleSource;
pub use classifier::{HttpClassifier, LexiconClassifier, LexiconModel, UnavailableClassifier};
pub use documents::HttpPdfFetcher;
pub use fallback::{DisabledAssessor, OpenAiAssessor};
pub use providers::{RedditProvider, XProvider};
pub use transcriber::HttpTranscriber;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use verisift_core::{ClassifierVerdict, EvidenceResult, FallbackVerdict};

/// User agent sent by every outbound request.
pub const USER_AGENT: &str = concat!("verisift/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// ERRORS
// =============================================================================

/// Failure of an external call. Never crosses the engine boundary:
/// the engine turns it into an `Unavailable` outcome.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The adapter is not configured or its backing model is not loaded.
    #[error("{0}")]
    Unavailable(String),

    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Http(String),

    /// The upstream service answered with a non-success status.
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The upstream answer could not be interpreted.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for AdapterError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

/// Turn a non-success response into `AdapterError::Status`.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, AdapterError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(AdapterError::Status {
        status: status.as_u16(),
        body,
    })
}

// =============================================================================
// CAPABILITY TRAITS
// =============================================================================

/// The fast local classifier.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ClassifierVerdict, AdapterError>;
}

/// The expensive language-model fallback.
///
/// Malformed upstream output must be normalised to an `Unknown` verdict by
/// the implementation; `Err` is reserved for the call itself failing.
#[async_trait]
pub trait FallbackAssessor: Send + Sync {
    async fn assess(&self, text: &str) -> Result<FallbackVerdict, AdapterError>;
}

/// An independent source of corroborating or contradicting material.
///
/// `search` never fails: errors are reported as an `ERROR` result.
#[async_trait]
pub trait EvidenceProvider: Send + Sync {
    /// Display name, used as `source_name` in results.
    fn name(&self) -> &str;

    async fn search(&self, query: &str) -> EvidenceResult;
}

/// Fetches a document and returns its text keyed by 1-based page number.
///
/// Any failure yields an empty map.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, locator: &str) -> BTreeMap<u32, String>;
}

/// Produces analysable text from a URL or an uploaded file.
///
/// `None` means nothing readable came out, including for input kinds the
/// source does not handle.
#[async_trait]
pub trait TextSource: Send + Sync {
    async fn extract(&self, input: &SourceInput) -> Option<String>;
}

/// What a `TextSource` reads from.
#[derive(Debug, Clone)]
pub enum SourceInput {
    Url(String),
    Upload(Upload),
}

/// An uploaded image or audio file.
#[derive(Clone, Default)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

impl Upload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("bytes", &self.bytes.len())
            .field("content_type", &self.content_type)
            .field("file_name", &self.file_name)
            .finish()
    }
}
