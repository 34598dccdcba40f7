//! # Configuration
//!
//! Settings are read from an optional TOML file and then overridden by
//! environment variables. A missing file is not an error: every field has
//! a default.
//!
//! ```toml
//! [timeouts]
//! classifier_ms = 5000
//! fallback_ms = 30000
//!
//! [classifier]
//! model_path = "models/lexicon.json"
//!
//! [transcription]
//! ocr_url = "http://localhost:9000/ocr"
//!
//! [[providers]]
//! kind = "reddit"
//!
//! [[catalog]]
//! title = "PIB Fact Check on Fake News Schemes"
//! locator = "https://pib.gov.in/FactCheck/guide_english.pdf"
//! keywords = ["scheme", "free", "laptop"]
//! ```
//!
//! ## Environment overrides
//!
//! - `VERISIFT_OPENAI_API_KEY`, `VERISIFT_OPENAI_MODEL`
//! - `VERISIFT_X_BEARER_TOKEN`
//! - `VERISIFT_CLASSIFIER_MODEL`, `VERISIFT_CLASSIFIER_URL`
//! - `VERISIFT_OCR_URL`, `VERISIFT_SPEECH_URL`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use verisift_core::catalog::builtin_suggested_sources;
use verisift_core::{CatalogEntry, DocumentCatalog, VerisiftError};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "verisift.toml";

/// Largest configuration file accepted (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// TIMEOUTS
// =============================================================================

/// Bounds on every suspension point, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeoutSettings {
    #[serde(default = "default_classifier_ms")]
    pub classifier_ms: u64,
    #[serde(default = "default_fallback_ms")]
    pub fallback_ms: u64,
    /// Per evidence provider.
    #[serde(default = "default_provider_ms")]
    pub provider_ms: u64,
    /// Per document fetch and parse, and per article download.
    #[serde(default = "default_document_ms")]
    pub document_ms: u64,
    /// Whole verdict path of one analysis.
    #[serde(default = "default_request_ms")]
    pub request_ms: u64,
    /// Per image or audio transcription.
    #[serde(default = "default_transcription_ms")]
    pub transcription_ms: u64,
}

fn default_classifier_ms() -> u64 {
    5_000
}

fn default_fallback_ms() -> u64 {
    30_000
}

fn default_provider_ms() -> u64 {
    10_000
}

fn default_document_ms() -> u64 {
    20_000
}

fn default_request_ms() -> u64 {
    60_000
}

fn default_transcription_ms() -> u64 {
    60_000
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            classifier_ms: default_classifier_ms(),
            fallback_ms: default_fallback_ms(),
            provider_ms: default_provider_ms(),
            document_ms: default_document_ms(),
            request_ms: default_request_ms(),
            transcription_ms: default_transcription_ms(),
        }
    }
}

/// Resolved timeouts handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub classifier: Duration,
    pub fallback: Duration,
    pub provider: Duration,
    pub document: Duration,
    pub request: Duration,
    pub transcription: Duration,
}

impl From<&TimeoutSettings> for Timeouts {
    fn from(t: &TimeoutSettings) -> Self {
        Self {
            classifier: Duration::from_millis(t.classifier_ms),
            fallback: Duration::from_millis(t.fallback_ms),
            provider: Duration::from_millis(t.provider_ms),
            document: Duration::from_millis(t.document_ms),
            request: Duration::from_millis(t.request_ms),
            transcription: Duration::from_millis(t.transcription_ms),
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::from(&TimeoutSettings::default())
    }
}

// =============================================================================
// ADAPTER SETTINGS
// =============================================================================

/// Where the classifier comes from. A model server URL wins over a model file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassifierSettings {
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FallbackSettings {
    /// Without a key the fallback is disabled and always unavailable.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_fallback_model")]
    pub model: String,
    #[serde(default = "default_fallback_base_url")]
    pub base_url: String,
}

fn default_fallback_model() -> String {
    "gpt-4o".to_string()
}

fn default_fallback_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_fallback_model(),
            base_url: default_fallback_base_url(),
        }
    }
}

/// Remote OCR and speech recognition services. Each one left unset
/// disables the matching upload route.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptionSettings {
    #[serde(default)]
    pub ocr_url: Option<String>,
    #[serde(default)]
    pub speech_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    X,
    Reddit,
}

/// One evidence provider. Order in the file is the order of results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl ProviderSettings {
    fn of(kind: ProviderKind) -> Self {
        Self {
            kind,
            base_url: None,
            bearer_token: None,
        }
    }
}

fn default_providers() -> Vec<ProviderSettings> {
    vec![
        ProviderSettings::of(ProviderKind::X),
        ProviderSettings::of(ProviderKind::Reddit),
    ]
}

// =============================================================================
// SETTINGS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub timeouts: TimeoutSettings,
    #[serde(default)]
    pub classifier: ClassifierSettings,
    #[serde(default)]
    pub fallback: FallbackSettings,
    #[serde(default)]
    pub transcription: TranscriptionSettings,
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderSettings>,
    /// Empty means the built-in catalog.
    #[serde(default)]
    pub catalog: Vec<CatalogEntry>,
    /// Empty means the built-in suggestions.
    #[serde(default)]
    pub suggested_sources: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeouts: TimeoutSettings::default(),
            classifier: ClassifierSettings::default(),
            fallback: FallbackSettings::default(),
            transcription: TranscriptionSettings::default(),
            providers: default_providers(),
            catalog: Vec::new(),
            suggested_sources: Vec::new(),
        }
    }
}

impl Settings {
    /// Load from `path` (defaults when absent), apply the process
    /// environment and validate.
    pub fn load(path: &Path) -> Result<Self, VerisiftError> {
        let mut settings = if path.exists() {
            let size = std::fs::metadata(path)
                .map_err(|e| VerisiftError::IoError(format!("Cannot stat config: {}", e)))?
                .len();
            if size > MAX_CONFIG_FILE_SIZE {
                return Err(VerisiftError::InvalidConfig(format!(
                    "config file is {} bytes, maximum is {}",
                    size, MAX_CONFIG_FILE_SIZE
                )));
            }
            let raw = std::fs::read_to_string(path).map_err(|e| {
                VerisiftError::IoError(format!("Cannot read '{}': {}", path.display(), e))
            })?;
            tracing::info!("Loaded configuration from {}", path.display());
            Self::from_toml_str(&raw)?
        } else {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Self::default()
        };

        settings.apply_env(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, VerisiftError> {
        toml::from_str(raw).map_err(|e| VerisiftError::InvalidConfig(e.to_string()))
    }

    /// Apply environment overrides through `lookup`. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(key) = get("VERISIFT_OPENAI_API_KEY") {
            self.fallback.api_key = Some(key);
        }
        if let Some(model) = get("VERISIFT_OPENAI_MODEL") {
            self.fallback.model = model;
        }
        if let Some(path) = get("VERISIFT_CLASSIFIER_MODEL") {
            self.classifier.model_path = Some(PathBuf::from(path));
        }
        if let Some(url) = get("VERISIFT_CLASSIFIER_URL") {
            self.classifier.url = Some(url);
        }
        if let Some(url) = get("VERISIFT_OCR_URL") {
            self.transcription.ocr_url = Some(url);
        }
        if let Some(url) = get("VERISIFT_SPEECH_URL") {
            self.transcription.speech_url = Some(url);
        }
        if let Some(token) = get("VERISIFT_X_BEARER_TOKEN") {
            for provider in &mut self.providers {
                if provider.kind == ProviderKind::X && provider.bearer_token.is_none() {
                    provider.bearer_token = Some(token.clone());
                }
            }
        }
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), VerisiftError> {
        let t = &self.timeouts;
        for (name, value) in [
            ("classifier_ms", t.classifier_ms),
            ("fallback_ms", t.fallback_ms),
            ("provider_ms", t.provider_ms),
            ("document_ms", t.document_ms),
            ("request_ms", t.request_ms),
            ("transcription_ms", t.transcription_ms),
        ] {
            if value == 0 {
                return Err(VerisiftError::InvalidConfig(format!(
                    "timeouts.{name} must be greater than zero"
                )));
            }
        }

        for (i, entry) in self.catalog.iter().enumerate() {
            if entry.title.trim().is_empty() || entry.locator.trim().is_empty() {
                return Err(VerisiftError::InvalidConfig(format!(
                    "catalog entry {i} needs a title and a locator"
                )));
            }
            if entry.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(VerisiftError::InvalidConfig(format!(
                    "catalog entry '{}' has no keywords",
                    entry.title
                )));
            }
        }

        for (name, url) in [
            ("classifier.url", &self.classifier.url),
            ("transcription.ocr_url", &self.transcription.ocr_url),
            ("transcription.speech_url", &self.transcription.speech_url),
        ] {
            if let Some(url) = url {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(VerisiftError::InvalidConfig(format!(
                        "{name} must be an http(s) URL, got '{url}'"
                    )));
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn timeouts(&self) -> Timeouts {
        Timeouts::from(&self.timeouts)
    }

    /// The catalog, falling back to the built-in entries and suggestions.
    #[must_use]
    pub fn document_catalog(&self) -> DocumentCatalog {
        let builtin = DocumentCatalog::builtin();
        let entries = if self.catalog.is_empty() {
            builtin.entries().to_vec()
        } else {
            self.catalog
                .iter()
                .map(|e| CatalogEntry {
                    title: e.title.clone(),
                    locator: e.locator.clone(),
                    keywords: e.keywords.iter().map(|k| k.to_lowercase()).collect(),
                })
                .collect()
        };
        let suggested = if self.suggested_sources.is_empty() {
            builtin_suggested_sources()
        } else {
            self.suggested_sources.clone()
        };
        DocumentCatalog::new(entries, suggested)
    }
}
