//! # Transcription Text Source
//!
//! Sends an uploaded image or audio file to an OCR or speech recognition
//! service and keeps the text it returns.
//!
//! The upload is posted as the raw request body with its own content type.
//! The service answers with:
//!
//! ```json
//! { "text": "Free laptops for every student announced" }
//! ```

use super::{AdapterError, SourceInput, TextSource, Upload, USER_AGENT, check_status};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use verisift_core::VerisiftError;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
struct TranscriptOut {
    #[serde(alias = "transcript")]
    text: String,
}

/// `TextSource` for uploads, backed by a remote OCR or ASR endpoint.
pub struct HttpTranscriber {
    http: reqwest::Client,
    url: String,
    name: &'static str,
}

impl HttpTranscriber {
    /// `name` labels log lines, e.g. `"ocr"` or `"speech"`.
    pub fn new(
        name: &'static str,
        url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, VerisiftError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| VerisiftError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            url: url.into(),
            name,
        })
    }

    async fn transcribe(&self, upload: &Upload) -> Result<String, AdapterError> {
        let content_type = upload
            .content_type
            .as_deref()
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        let mut request = self
            .http
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(upload.bytes.clone());
        if let Some(file_name) = &upload.file_name {
            request = request.query(&[("filename", file_name)]);
        }

        let resp = check_status(request.send().await?).await?;
        let body = resp.text().await?;
        transcript_text(&body)
    }
}

/// Pull the transcript out of a service answer. Surrounding whitespace is
/// dropped; a blank transcript is an empty string.
pub fn transcript_text(body: &str) -> Result<String, AdapterError> {
    let out: TranscriptOut =
        serde_json::from_str(body).map_err(|e| AdapterError::Malformed(e.to_string()))?;
    Ok(out.text.trim().to_string())
}

#[async_trait]
impl TextSource for HttpTranscriber {
    async fn extract(&self, input: &SourceInput) -> Option<String> {
        let SourceInput::Upload(upload) = input else {
            tracing::debug!(source = self.name, "Transcriber ignores URLs");
            return None;
        };

        match self.transcribe(upload).await {
            Ok(text) if text.is_empty() => {
                tracing::info!(source = self.name, "Transcription produced no text");
                None
            }
            Ok(text) => {
                tracing::debug!(
                    source = self.name,
                    chars = text.chars().count(),
                    "Transcribed upload"
                );
                Some(text)
            }
            Err(e) => {
                tracing::warn!(source = self.name, error = %e, "Transcription failed");
                None
            }
        }
    }
}
