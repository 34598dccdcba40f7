//! # Verdict Orchestrator
//!
//! Drives one analysis: classifier, fallback decision, optional fallback,
//! merge, with evidence gathered alongside the whole verdict path.
//!
//! ```text
//!  t0 ──┬── classify ── decide ── [assess] ── merge ──┐
//!       │                                              ├── response
//!       └── gather evidence (all providers) ──────────┘
//! ```
//!
//! Every adapter call runs on its own task under its own timeout, so a
//! panic, error or stall is reduced to an `Unavailable` outcome at that
//! call's boundary. The verdict path as a whole is bounded by the request
//! timeout; evidence is bounded per provider.

use super::EvidenceGatherer;
use crate::adapters::{Classifier, FallbackAssessor, SourceInput, TextSource};
use crate::config::Timeouts;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use verisift_core::{
    AnalysisRequest, ClassifierOutcome, FallbackOutcome, FinalAnalysisResponse, FinalVerdict,
    Provenance, VerisiftError, fallback_decision, merge,
};
use verisift_core::primitives::MAX_UPLOAD_BYTES;

pub struct Orchestrator {
    classifier: Arc<dyn Classifier>,
    assessor: Arc<dyn FallbackAssessor>,
    gatherer: EvidenceGatherer,
    text_sources: Vec<(Provenance, Arc<dyn TextSource>)>,
    timeouts: Timeouts,
}

impl Orchestrator {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        assessor: Arc<dyn FallbackAssessor>,
        gatherer: EvidenceGatherer,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            classifier,
            assessor,
            gatherer,
            text_sources: Vec::new(),
            timeouts,
        }
    }

    /// Install the text producer for one kind of input, replacing any
    /// earlier one for the same kind.
    #[must_use]
    pub fn with_text_source(mut self, provenance: Provenance, source: Arc<dyn TextSource>) -> Self {
        self.text_sources.retain(|(kind, _)| *kind != provenance);
        self.text_sources.push((provenance, source));
        self
    }

    /// Enable `analyze_url` with the given text producer.
    #[must_use]
    pub fn with_article_source(self, source: Arc<dyn TextSource>) -> Self {
        self.with_text_source(Provenance::Url, source)
    }

    /// Input kinds with an installed text producer, in installation order.
    pub fn text_source_kinds(&self) -> Vec<Provenance> {
        self.text_sources.iter().map(|(kind, _)| *kind).collect()
    }

    pub fn gatherer(&self) -> &EvidenceGatherer {
        &self.gatherer
    }

    // =========================================================================
    // ENTRY POINTS
    // =========================================================================

    /// Analyse `text`. Never fails: adapter failures surface in the verdict
    /// or in individual evidence results.
    pub async fn analyze(&self, text: &str) -> FinalAnalysisResponse {
        let shared: Arc<str> = Arc::from(text);

        let (analysis, related_sources) = tokio::join!(
            self.verdict_within_deadline(Arc::clone(&shared)),
            self.gatherer.gather(text),
        );

        tracing::info!(
            verdict = ?analysis.verdict(),
            confidence = analysis.confidence().value(),
            source = ?analysis.source(),
            evidence = related_sources.len(),
            "Analysis complete"
        );

        FinalAnalysisResponse::new(analysis, related_sources, text.to_string())
    }

    pub async fn analyze_request(&self, request: &AnalysisRequest) -> FinalAnalysisResponse {
        tracing::debug!(provenance = ?request.provenance(), "Analysing request");
        self.analyze(request.text()).await
    }

    /// Validate raw text, then analyse it.
    pub async fn analyze_text(&self, text: &str) -> Result<FinalAnalysisResponse, VerisiftError> {
        let request = AnalysisRequest::new(text, Provenance::Raw)?;
        Ok(self.analyze_request(&request).await)
    }

    /// Download an article, keep its paragraph text, then analyse it.
    pub async fn analyze_url(&self, url: &str) -> Result<FinalAnalysisResponse, VerisiftError> {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(VerisiftError::InvalidUrl(url.to_string()));
        }
        self.analyze_source(Provenance::Url, SourceInput::Url(url.to_string()))
            .await
    }

    /// Turn `input` into text with the producer installed for `provenance`,
    /// then analyse it.
    ///
    /// Uploads must be non-empty and at most `MAX_UPLOAD_BYTES`. A producer
    /// that fails, stalls or returns nothing yields `NoExtractableText`.
    pub async fn analyze_source(
        &self,
        provenance: Provenance,
        input: SourceInput,
    ) -> Result<FinalAnalysisResponse, VerisiftError> {
        if let SourceInput::Upload(upload) = &input {
            if upload.bytes.is_empty() {
                return Err(VerisiftError::InvalidUpload("file is empty".to_string()));
            }
            if upload.bytes.len() > MAX_UPLOAD_BYTES {
                return Err(VerisiftError::InvalidUpload(format!(
                    "file of {} bytes exceeds {} byte limit",
                    upload.bytes.len(),
                    MAX_UPLOAD_BYTES
                )));
            }
        }

        let source = self
            .text_sources
            .iter()
            .find(|(kind, _)| *kind == provenance)
            .map(|(_, source)| Arc::clone(source))
            .ok_or(VerisiftError::NoTextSource(provenance))?;

        let limit = match provenance {
            Provenance::Image | Provenance::Voice => self.timeouts.transcription,
            Provenance::Raw | Provenance::Url => self.timeouts.document,
        };
        let name = format!("{provenance} source");
        let text = match run_contained(&name, limit, async move { source.extract(&input).await })
            .await
        {
            Ok(Some(text)) => text,
            Ok(None) => return Err(VerisiftError::NoExtractableText),
            Err(reason) => {
                tracing::warn!(%provenance, reason = %reason, "Text extraction failed");
                return Err(VerisiftError::NoExtractableText);
            }
        };

        let request = AnalysisRequest::new(text, provenance)?;
        Ok(self.analyze_request(&request).await)
    }

    // =========================================================================
    // VERDICT PATH
    // =========================================================================

    async fn verdict_within_deadline(&self, text: Arc<str>) -> FinalVerdict {
        let limit = self.timeouts.request;
        match tokio::time::timeout(limit, self.verdict(text)).await {
            Ok(verdict) => verdict,
            Err(_) => {
                tracing::warn!("Verdict path exceeded the request deadline");
                FinalVerdict::error(format!(
                    "Analysis did not complete within {}ms",
                    limit.as_millis()
                ))
            }
        }
    }

    async fn verdict(&self, text: Arc<str>) -> FinalVerdict {
        let classifier = self.classify(Arc::clone(&text)).await;

        let decision = fallback_decision(&text, &classifier);
        let fallback = if decision.is_required() {
            tracing::debug!(reason = %decision, "Fallback required");
            Some(self.assess(text).await)
        } else {
            tracing::debug!("Classifier verdict accepted");
            None
        };

        merge(&classifier, fallback.as_ref())
    }

    async fn classify(&self, text: Arc<str>) -> ClassifierOutcome {
        let classifier = Arc::clone(&self.classifier);
        let call = async move { classifier.classify(&text).await };

        match run_contained("classifier", self.timeouts.classifier, call).await {
            Ok(Ok(verdict)) => ClassifierOutcome::Available(verdict),
            Ok(Err(e)) => {
                tracing::warn!(adapter = "classifier", error = %e, "Adapter call failed");
                ClassifierOutcome::unavailable(e.to_string())
            }
            Err(reason) => {
                tracing::warn!(adapter = "classifier", reason = %reason, "Adapter call failed");
                ClassifierOutcome::unavailable(reason)
            }
        }
    }

    async fn assess(&self, text: Arc<str>) -> FallbackOutcome {
        let assessor = Arc::clone(&self.assessor);
        let call = async move { assessor.assess(&text).await };

        match run_contained("fallback", self.timeouts.fallback, call).await {
            Ok(Ok(verdict)) => FallbackOutcome::Available(verdict),
            Ok(Err(e)) => {
                tracing::warn!(adapter = "fallback", error = %e, "Adapter call failed");
                FallbackOutcome::unavailable(e.to_string())
            }
            Err(reason) => {
                tracing::warn!(adapter = "fallback", reason = %reason, "Adapter call failed");
                FallbackOutcome::unavailable(reason)
            }
        }
    }
}

/// Run `fut` on its own task, bounded by `limit`.
///
/// `Err` carries a reason when the task panicked, was cancelled or ran out
/// of time. The task is aborted when this future completes or is dropped.
pub(crate) async fn run_contained<T, F>(name: &str, limit: Duration, fut: F) -> Result<T, String>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    let mut task = JoinSet::new();
    task.spawn(fut);

    match tokio::time::timeout(limit, task.join_next()).await {
        Ok(Some(Ok(value))) => Ok(value),
        Ok(Some(Err(e))) if e.is_panic() => Err(format!("{name} panicked")),
        Ok(Some(Err(_))) => Err(format!("{name} was cancelled")),
        Ok(None) => Err(format!("{name} was not started")),
        Err(_) => Err(format!("{} timed out after {}ms", name, limit.as_millis())),
    }
}
