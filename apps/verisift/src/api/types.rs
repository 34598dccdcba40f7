//! # API Request/Response Types
//!
//! JSON bodies of the HTTP API. Analysis and verification responses are the
//! core artifacts themselves (`FinalAnalysisResponse`, `VerificationResult`).

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use verisift_core::{CatalogEntry, DocumentCatalog, VerisiftError};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Body of `POST /api/v1/analysis`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextIn {
    pub text: String,
}

/// Body of `POST /api/v1/analyze-url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlIn {
    pub url: String,
}

/// Body of `POST /api/v1/verify-claim-pdf`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationQueryIn {
    pub query: String,
}

// =============================================================================
// CATALOG RESPONSE
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub documents: Vec<CatalogDocument>,
    pub suggested_sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub title: String,
    pub locator: String,
    pub keywords: Vec<String>,
    /// False for web pages, which are only ever suggested.
    pub searchable: bool,
}

impl From<&CatalogEntry> for CatalogDocument {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            title: entry.title.clone(),
            locator: entry.locator.clone(),
            keywords: entry.keywords.clone(),
            searchable: entry.is_parseable_document(),
        }
    }
}

impl From<&DocumentCatalog> for CatalogResponse {
    fn from(catalog: &DocumentCatalog) -> Self {
        Self {
            documents: catalog.entries().iter().map(CatalogDocument::from).collect(),
            suggested_sources: catalog.suggested_sources().to_vec(),
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Error body: `{ "error": "<message>" }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A `VerisiftError` rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub VerisiftError);

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            VerisiftError::QueryTooShort { .. } | VerisiftError::QueryTooLong { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            VerisiftError::NoTextSource(_) => StatusCode::NOT_IMPLEMENTED,
            e if e.is_input_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<VerisiftError> for ApiError {
    fn from(e: VerisiftError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        // Internal details stay in the log.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
