//! # Classifier Adapters
//!
//! - `LexiconClassifier`: a linear bag-of-words model loaded once at startup
//!   from a JSON weights file and held as an immutable handle.
//! - `HttpClassifier`: delegates to a remote model server.
//! - `UnavailableClassifier`: stands in when no model could be loaded.
//!
//! Model format:
//!
//! ```json
//! { "bias": -0.3, "weights": { "shocking": 1.7, "according": -0.9 } }
//! ```
//!
//! Positive weights lean towards `Fake`.

#![allow(clippy::float_arithmetic)]

use super::{AdapterError, Classifier, USER_AGENT, check_status};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Duration;
use verisift_core::{ClassifierLabel, ClassifierVerdict, Confidence, VerisiftError};

/// Number of fake-leaning terms reported as `highlighted`.
const MAX_HIGHLIGHTED: usize = 5;

const MODEL_EXPLANATION: &str =
    "This verdict is based on a machine learning analysis of the text's content and structure.";

// =============================================================================
// LEXICON MODEL
// =============================================================================

/// Weights of the linear model.
#[derive(Debug, Clone, Deserialize)]
pub struct LexiconModel {
    #[serde(default)]
    pub bias: f64,
    pub weights: BTreeMap<String, f64>,
}

impl LexiconModel {
    /// Load and validate a model file.
    pub fn load(path: &Path) -> Result<Self, VerisiftError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            VerisiftError::IoError(format!("Cannot read model '{}': {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, VerisiftError> {
        let model: Self = serde_json::from_str(raw)
            .map_err(|e| VerisiftError::SerializationError(format!("Invalid model: {e}")))?;
        if model.weights.is_empty() {
            return Err(VerisiftError::InvalidConfig(
                "classifier model has an empty vocabulary".to_string(),
            ));
        }
        if !model.bias.is_finite() || model.weights.values().any(|w| !w.is_finite()) {
            return Err(VerisiftError::InvalidConfig(
                "classifier model contains non-finite weights".to_string(),
            ));
        }
        Ok(model)
    }

    /// Predict on already-tokenised text.
    fn predict(&self, tokens: &BTreeSet<String>) -> Prediction {
        let mut score = self.bias;
        let mut fake_terms: Vec<(&str, f64)> = Vec::new();

        for token in tokens {
            if let Some(&weight) = self.weights.get(token) {
                score += weight;
                if weight > 0.0 {
                    fake_terms.push((token.as_str(), weight));
                }
            }
        }

        // Highest weight first; BTreeSet order breaks ties.
        fake_terms.sort_by(|a, b| b.1.total_cmp(&a.1));
        let highlighted = fake_terms
            .into_iter()
            .take(MAX_HIGHLIGHTED)
            .map(|(t, _)| t.to_string())
            .collect();

        Prediction {
            p_fake: 1.0 / (1.0 + (-score).exp()),
            highlighted,
            known_terms: tokens.iter().filter(|t| self.weights.contains_key(*t)).count(),
        }
    }
}

struct Prediction {
    p_fake: f64,
    highlighted: Vec<String>,
    known_terms: usize,
}

/// Lower-cased alphanumeric tokens of `text`, deduplicated.
fn tokenize(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|t| t.trim_matches('\'').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Classifier backed by an immutable `LexiconModel`.
pub struct LexiconClassifier {
    model: LexiconModel,
}

impl LexiconClassifier {
    pub fn new(model: LexiconModel) -> Self {
        Self { model }
    }

    /// Synchronous classification.
    pub fn classify_sync(&self, text: &str) -> ClassifierVerdict {
        let tokens = tokenize(text);
        let prediction = self.model.predict(&tokens);

        if prediction.known_terms == 0 {
            return ClassifierVerdict::new(
                ClassifierLabel::Uncertain,
                Confidence::zero(),
                "None of the text's terms are known to the model.",
                Vec::new(),
            );
        }

        let (label, probability) = if prediction.p_fake >= 0.5 {
            (ClassifierLabel::Fake, prediction.p_fake)
        } else {
            (ClassifierLabel::Real, 1.0 - prediction.p_fake)
        };

        ClassifierVerdict::new(
            label,
            Confidence::clamped((probability * 100.0) as i64),
            MODEL_EXPLANATION,
            prediction.highlighted,
        )
    }
}

#[async_trait]
impl Classifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<ClassifierVerdict, AdapterError> {
        Ok(self.classify_sync(text))
    }
}

// =============================================================================
// HTTP CLASSIFIER
// =============================================================================

/// Classifier served by a remote model server.
///
/// `POST <url>` with `{"text": "..."}`, expecting a `ClassifierVerdict` JSON body.
pub struct HttpClassifier {
    http: reqwest::Client,
    url: String,
}

impl HttpClassifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, VerisiftError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| VerisiftError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, text: &str) -> Result<ClassifierVerdict, AdapterError> {
        let body = serde_json::json!({ "text": text });
        let resp = self.http.post(&self.url).json(&body).send().await?;
        let resp = check_status(resp).await?;
        resp.json::<ClassifierVerdict>()
            .await
            .map_err(|e| AdapterError::Malformed(e.to_string()))
    }
}

// =============================================================================
// UNAVAILABLE CLASSIFIER
// =============================================================================

/// Always fails with the reason the real classifier could not be built.
pub struct UnavailableClassifier {
    reason: String,
}

impl UnavailableClassifier {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Classifier for UnavailableClassifier {
    async fn classify(&self, _text: &str) -> Result<ClassifierVerdict, AdapterError> {
        Err(AdapterError::Unavailable(self.reason.clone()))
    }
}
