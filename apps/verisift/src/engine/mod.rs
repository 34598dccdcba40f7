//! # Engine
//!
//! The async half of Verisift: it calls the adapters, bounds every call in
//! time and hands their outcomes to `verisift-core` for the decisions.
//!
//! - `EvidenceGatherer` - concurrent provider fan-out (`gather`)
//! - `Orchestrator` - the verdict pipeline (`orchestrator`)
//! - `DocumentVerifier` - catalog search (`verifier`)
//!
//! `Engine` wires the three together from `Settings`. It holds no mutable
//! state and is shared across requests behind an `Arc`.

mod gather;
mod orchestrator;
mod verifier;

pub use gather::EvidenceGatherer;
pub use orchestrator::Orchestrator;
pub use verifier::DocumentVerifier;

use crate::adapters::{
    ArticleSource, Classifier, DisabledAssessor, EvidenceProvider, FallbackAssessor,
    HttpClassifier, HttpPdfFetcher, HttpTranscriber, LexiconClassifier, LexiconModel,
    OpenAiAssessor, RedditProvider, UnavailableClassifier, XProvider,
};
use crate::config::{ClassifierSettings, ProviderKind, Settings};
use std::sync::Arc;
use std::time::Duration;
use verisift_core::{Provenance, VerisiftError};

/// Everything a request handler needs.
pub struct Engine {
    orchestrator: Orchestrator,
    verifier: DocumentVerifier,
}

impl Engine {
    pub fn new(orchestrator: Orchestrator, verifier: DocumentVerifier) -> Self {
        Self {
            orchestrator,
            verifier,
        }
    }

    /// Build the production adapters described by `settings`.
    ///
    /// A classifier model that fails to load does not stop startup: the
    /// engine runs with an unavailable classifier and relies on the fallback.
    pub fn from_settings(settings: &Settings) -> Result<Self, VerisiftError> {
        let timeouts = settings.timeouts();

        let classifier = load_classifier(&settings.classifier, timeouts.classifier)?;

        let assessor: Arc<dyn FallbackAssessor> = match &settings.fallback.api_key {
            Some(key) => Arc::new(OpenAiAssessor::new(
                &settings.fallback.base_url,
                key,
                &settings.fallback.model,
                timeouts.fallback,
            )?),
            None => {
                tracing::warn!("No fallback API key configured; fallback model disabled");
                Arc::new(DisabledAssessor)
            }
        };

        let mut providers: Vec<Arc<dyn EvidenceProvider>> = Vec::new();
        for provider in &settings.providers {
            match provider.kind {
                ProviderKind::X => providers.push(Arc::new(XProvider::new(
                    provider.base_url.as_deref().unwrap_or(XProvider::DEFAULT_BASE_URL),
                    provider.bearer_token.clone(),
                    timeouts.provider,
                )?)),
                ProviderKind::Reddit => providers.push(Arc::new(RedditProvider::new(
                    provider
                        .base_url
                        .as_deref()
                        .unwrap_or(RedditProvider::DEFAULT_BASE_URL),
                    timeouts.provider,
                )?)),
            }
        }

        let mut orchestrator = Orchestrator::new(
            classifier,
            assessor,
            EvidenceGatherer::new(providers, timeouts.provider),
            timeouts,
        )
        .with_article_source(Arc::new(ArticleSource::new(timeouts.document)?));

        let media = &settings.transcription;
        for (provenance, name, url) in [
            (Provenance::Image, "ocr", &media.ocr_url),
            (Provenance::Voice, "speech", &media.speech_url),
        ] {
            match url {
                Some(url) => {
                    tracing::info!("Using {} service at {}", name, url);
                    orchestrator = orchestrator.with_text_source(
                        provenance,
                        Arc::new(HttpTranscriber::new(name, url, timeouts.transcription)?),
                    );
                }
                None => tracing::info!(
                    "No {} service configured; {} uploads are refused",
                    name,
                    provenance
                ),
            }
        }

        let verifier = DocumentVerifier::new(
            Arc::new(settings.document_catalog()),
            Arc::new(HttpPdfFetcher::new(timeouts.document)?),
            timeouts.document,
        );

        Ok(Self::new(orchestrator, verifier))
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn verifier(&self) -> &DocumentVerifier {
        &self.verifier
    }
}

/// The classifier described by `settings`.
///
/// Only an invalid HTTP client configuration is an error; a missing or
/// broken model file yields an `UnavailableClassifier`.
pub fn load_classifier(
    settings: &ClassifierSettings,
    timeout: Duration,
) -> Result<Arc<dyn Classifier>, VerisiftError> {
    if let Some(url) = &settings.url {
        tracing::info!("Using classifier server at {}", url);
        return Ok(Arc::new(HttpClassifier::new(url, timeout)?));
    }

    let Some(path) = &settings.model_path else {
        tracing::warn!("No classifier model configured; every text goes to the fallback");
        return Ok(Arc::new(UnavailableClassifier::new(
            "Classifier model not loaded",
        )));
    };

    match LexiconModel::load(path) {
        Ok(model) => {
            tracing::info!(
                terms = model.weights.len(),
                "Loaded classifier model from {}",
                path.display()
            );
            Ok(Arc::new(LexiconClassifier::new(model)))
        }
        Err(e) => {
            tracing::error!("Classifier model failed to load: {}", e);
            Ok(Arc::new(UnavailableClassifier::new(format!(
                "Classifier model not loaded: {e}"
            ))))
        }
    }
}
