//! # API Endpoint Handlers

use super::{
    AppState,
    types::{ApiError, CatalogResponse, HealthResponse, TextIn, UrlIn, VerificationQueryIn},
};
use crate::adapters::{SourceInput, Upload};
use axum::{
    Json,
    extract::{Multipart, State},
    response::IntoResponse,
};
use verisift_core::{FinalAnalysisResponse, Provenance, VerificationResult, VerisiftError};

/// Multipart field carrying the uploaded file.
const UPLOAD_FIELD: &str = "file";

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// ANALYSIS
// =============================================================================

/// Analyse submitted text.
pub async fn analysis_handler(
    State(state): State<AppState>,
    Json(request): Json<TextIn>,
) -> Result<Json<FinalAnalysisResponse>, ApiError> {
    let response = state.engine.orchestrator().analyze_text(&request.text).await?;
    Ok(Json(response))
}

/// Analyse the paragraph text of an article URL.
pub async fn analyze_url_handler(
    State(state): State<AppState>,
    Json(request): Json<UrlIn>,
) -> Result<Json<FinalAnalysisResponse>, ApiError> {
    let response = state.engine.orchestrator().analyze_url(&request.url).await?;
    Ok(Json(response))
}

/// Analyse the text found in an uploaded image.
pub async fn analyze_image_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<FinalAnalysisResponse>, ApiError> {
    analyze_upload(&state, Provenance::Image, multipart).await
}

/// Analyse the transcript of an uploaded audio recording.
pub async fn analyze_voice_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<FinalAnalysisResponse>, ApiError> {
    analyze_upload(&state, Provenance::Voice, multipart).await
}

async fn analyze_upload(
    state: &AppState,
    provenance: Provenance,
    multipart: Multipart,
) -> Result<Json<FinalAnalysisResponse>, ApiError> {
    let upload = read_upload(multipart).await?;
    tracing::debug!(%provenance, bytes = upload.bytes.len(), "Received upload");
    let response = state
        .engine
        .orchestrator()
        .analyze_source(provenance, SourceInput::Upload(upload))
        .await?;
    Ok(Json(response))
}

/// The first `file` field of the form. Other fields are skipped.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    let invalid = |e: axum::extract::multipart::MultipartError| {
        ApiError(VerisiftError::InvalidUpload(e.body_text()))
    };

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(invalid)?;

        let mut upload = Upload::new(bytes.to_vec());
        upload.content_type = content_type;
        upload.file_name = file_name;
        return Ok(upload);
    }

    Err(ApiError(VerisiftError::InvalidUpload(format!(
        "missing '{UPLOAD_FIELD}' field"
    ))))
}

// =============================================================================
// VERIFICATION
// =============================================================================

/// Search the official documents for a passage addressing the query.
pub async fn verify_claim_handler(
    State(state): State<AppState>,
    Json(request): Json<VerificationQueryIn>,
) -> Result<Json<VerificationResult>, ApiError> {
    let result = state.engine.verifier().verify(&request.query).await?;
    Ok(Json(result))
}

/// List the curated documents and fallback suggestions.
pub async fn catalog_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(CatalogResponse::from(state.engine.verifier().catalog()))
}
