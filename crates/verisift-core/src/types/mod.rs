//! # Core Type Definitions
//!
//! This module contains all core types for the Verisift decision logic:
//! - Confidence and input types (`Confidence`, `AnalysisRequest`, `VerificationQuery`)
//! - Adapter outputs (`ClassifierVerdict`, `FallbackVerdict`, `EvidenceResult`)
//! - Adapter outcomes as tagged unions (`ClassifierOutcome`, `FallbackOutcome`)
//! - Terminal artifacts (`FinalVerdict`, `FinalAnalysisResponse`, `VerificationResult`)
//! - Error types (`VerisiftError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer confidences only (no floating-point)
//! - Are immutable once built; terminal artifacts expose getters, not fields

use crate::primitives::{MAX_CONFIDENCE, MAX_QUERY_LENGTH, MAX_TEXT_LENGTH, MIN_QUERY_LENGTH};
use crate::relevance::extract_keywords;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

// =============================================================================
// CONFIDENCE
// =============================================================================

/// Confidence score in the closed range `[0, 100]`.
///
/// Every constructor clamps, so an out-of-range value can never be observed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(from = "i64", into = "u8")]
pub struct Confidence(u8);

impl Confidence {
    /// Create a confidence, clamping to 100.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        if value > MAX_CONFIDENCE {
            Self(MAX_CONFIDENCE)
        } else {
            Self(value)
        }
    }

    /// Zero confidence.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Create a confidence from any integer, clamping into `[0, 100]`.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, MAX_CONFIDENCE as i64) as u8)
    }

    /// Get the raw value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl From<i64> for Confidence {
    fn from(value: i64) -> Self {
        Self::clamped(value)
    }
}

impl From<Confidence> for u8 {
    fn from(confidence: Confidence) -> Self {
        confidence.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// =============================================================================
// ANALYSIS REQUEST
// =============================================================================

/// Which external producer the analysed text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    #[default]
    Raw,
    Url,
    Image,
    Voice,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Raw => "raw",
            Self::Url => "url",
            Self::Image => "image",
            Self::Voice => "voice",
        };
        f.write_str(name)
    }
}

/// Text submitted for analysis, validated at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    text: String,
    provenance: Provenance,
}

impl AnalysisRequest {
    /// Build a request, rejecting blank or oversized text.
    pub fn new(text: impl Into<String>, provenance: Provenance) -> Result<Self, VerisiftError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(VerisiftError::EmptyText);
        }
        if text.len() > MAX_TEXT_LENGTH {
            return Err(VerisiftError::TextTooLong {
                len: text.len(),
                max: MAX_TEXT_LENGTH,
            });
        }
        Ok(Self { text, provenance })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn provenance(&self) -> Provenance {
        self.provenance
    }
}

// =============================================================================
// CLASSIFIER VERDICT
// =============================================================================

/// Label produced by the local classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassifierLabel {
    Fake,
    Real,
    Uncertain,
}

impl fmt::Display for ClassifierLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fake => "Fake",
            Self::Real => "Real",
            Self::Uncertain => "Uncertain",
        };
        f.write_str(name)
    }
}

/// Output of one classifier call. Never mutated after production.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierVerdict {
    pub verdict: ClassifierLabel,
    pub confidence: Confidence,
    pub explanation: String,
    /// Suspicious terms, in the order the classifier ranked them.
    #[serde(default)]
    pub highlighted: Vec<String>,
}

impl ClassifierVerdict {
    #[must_use]
    pub fn new(
        verdict: ClassifierLabel,
        confidence: Confidence,
        explanation: impl Into<String>,
        highlighted: Vec<String>,
    ) -> Self {
        Self {
            verdict,
            confidence,
            explanation: explanation.into(),
            highlighted,
        }
    }
}

/// Result of invoking the classifier: either a verdict or the reason there is none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifierOutcome {
    Available(ClassifierVerdict),
    Unavailable { reason: String },
}

impl ClassifierOutcome {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn verdict(&self) -> Option<&ClassifierVerdict> {
        match self {
            Self::Available(v) => Some(v),
            Self::Unavailable { .. } => None,
        }
    }
}

// =============================================================================
// FALLBACK VERDICT
// =============================================================================

/// Label produced by the language-model fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FallbackLabel {
    Real,
    Fake,
    Unknown,
}

impl FallbackLabel {
    /// Parse an upstream label; anything unrecognised is `Unknown`.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "real" | "true" | "credible" => Self::Real,
            "fake" | "false" | "misleading" => Self::Fake,
            _ => Self::Unknown,
        }
    }
}

/// Output of one fallback call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackVerdict {
    pub verdict: FallbackLabel,
    pub confidence: Confidence,
    pub explanation: String,
    #[serde(default)]
    pub key_indicators: Vec<String>,
}

impl FallbackVerdict {
    #[must_use]
    pub fn new(
        verdict: FallbackLabel,
        confidence: Confidence,
        explanation: impl Into<String>,
        key_indicators: Vec<String>,
    ) -> Self {
        Self {
            verdict,
            confidence,
            explanation: explanation.into(),
            key_indicators,
        }
    }

    /// The normalised "could not assess" verdict.
    pub fn unknown(explanation: impl Into<String>) -> Self {
        Self::new(
            FallbackLabel::Unknown,
            Confidence::zero(),
            explanation,
            Vec::new(),
        )
    }
}

/// Result of invoking the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackOutcome {
    Available(FallbackVerdict),
    Unavailable { reason: String },
}

impl FallbackOutcome {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn verdict(&self) -> Option<&FallbackVerdict> {
        match self {
            Self::Available(v) => Some(v),
            Self::Unavailable { .. } => None,
        }
    }
}

// =============================================================================
// EVIDENCE
// =============================================================================

/// Whether an evidence provider answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceStatus {
    Success,
    Error,
}

/// One corroborating or contradicting record from a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Platform the record came from.
    pub source: String,
    pub text: String,
    /// Popularity or interaction score as reported by the platform.
    #[serde(default)]
    pub engagement_score: i64,
    #[serde(default)]
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Everything one provider returned for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceResult {
    pub source_name: String,
    pub status: EvidenceStatus,
    #[serde(default, alias = "data")]
    pub items: Vec<EvidenceItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl EvidenceResult {
    pub fn success(source_name: impl Into<String>, items: Vec<EvidenceItem>) -> Self {
        Self {
            source_name: source_name.into(),
            status: EvidenceStatus::Success,
            items,
            error_message: None,
        }
    }

    pub fn error(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            status: EvidenceStatus::Error,
            items: Vec::new(),
            error_message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == EvidenceStatus::Success
    }
}

// =============================================================================
// FINAL VERDICT
// =============================================================================

/// Label of the merged verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinalLabel {
    Real,
    Fake,
    Uncertain,
    Unknown,
    Error,
}

impl From<ClassifierLabel> for FinalLabel {
    fn from(label: ClassifierLabel) -> Self {
        match label {
            ClassifierLabel::Fake => Self::Fake,
            ClassifierLabel::Real => Self::Real,
            ClassifierLabel::Uncertain => Self::Uncertain,
        }
    }
}

impl From<FallbackLabel> for FinalLabel {
    fn from(label: FallbackLabel) -> Self {
        match label {
            FallbackLabel::Real => Self::Real,
            FallbackLabel::Fake => Self::Fake,
            FallbackLabel::Unknown => Self::Unknown,
        }
    }
}

/// Which opinion the final verdict was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerdictSource {
    ClassifierModel,
    FallbackModel,
    Error,
}

/// The merged verdict.
///
/// Only the merger (and the orchestrator's error path) builds one, so
/// `source` always agrees with the populated fields. It is serialized for
/// responses but never deserialized:
///
/// ```compile_fail
/// fn from_json<T: serde::de::DeserializeOwned>() {}
/// from_json::<verisift_core::FinalVerdict>();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalVerdict {
    verdict: FinalLabel,
    confidence: Confidence,
    explanation: String,
    highlighted: Vec<String>,
    key_indicators: Vec<String>,
    source: VerdictSource,
}

impl FinalVerdict {
    pub(crate) fn from_classifier(verdict: &ClassifierVerdict) -> Self {
        Self {
            verdict: verdict.verdict.into(),
            confidence: verdict.confidence,
            explanation: verdict.explanation.clone(),
            highlighted: verdict.highlighted.clone(),
            key_indicators: Vec::new(),
            source: VerdictSource::ClassifierModel,
        }
    }

    pub(crate) fn from_fallback(verdict: &FallbackVerdict, highlighted: Vec<String>) -> Self {
        Self {
            verdict: verdict.verdict.into(),
            confidence: verdict.confidence,
            explanation: verdict.explanation.clone(),
            highlighted,
            key_indicators: verdict.key_indicators.clone(),
            source: VerdictSource::FallbackModel,
        }
    }

    /// The verdict used when no opinion is usable or the pipeline failed.
    pub fn error(explanation: impl Into<String>) -> Self {
        Self {
            verdict: FinalLabel::Error,
            confidence: Confidence::zero(),
            explanation: explanation.into(),
            highlighted: Vec::new(),
            key_indicators: Vec::new(),
            source: VerdictSource::Error,
        }
    }

    #[must_use]
    pub fn verdict(&self) -> FinalLabel {
        self.verdict
    }

    #[must_use]
    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn highlighted(&self) -> &[String] {
        &self.highlighted
    }

    #[must_use]
    pub fn key_indicators(&self) -> &[String] {
        &self.key_indicators
    }

    #[must_use]
    pub fn source(&self) -> VerdictSource {
        self.source
    }
}

/// The terminal artifact of one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalAnalysisResponse {
    analysis: FinalVerdict,
    related_sources: Vec<EvidenceResult>,
    extracted_text: String,
}

impl FinalAnalysisResponse {
    #[must_use]
    pub fn new(
        analysis: FinalVerdict,
        related_sources: Vec<EvidenceResult>,
        extracted_text: String,
    ) -> Self {
        Self {
            analysis,
            related_sources,
            extracted_text,
        }
    }

    #[must_use]
    pub fn analysis(&self) -> &FinalVerdict {
        &self.analysis
    }

    #[must_use]
    pub fn related_sources(&self) -> &[EvidenceResult] {
        &self.related_sources
    }

    #[must_use]
    pub fn extracted_text(&self) -> &str {
        &self.extracted_text
    }
}

// =============================================================================
// VERIFICATION
// =============================================================================

/// A claim or question to check against the document catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationQuery(String);

impl VerificationQuery {
    /// Validate a raw query. Length is counted in characters, untrimmed.
    pub fn parse(raw: &str) -> Result<Self, VerisiftError> {
        let len = raw.chars().count();
        if len < MIN_QUERY_LENGTH {
            return Err(VerisiftError::QueryTooShort {
                len,
                min: MIN_QUERY_LENGTH,
            });
        }
        if len > MAX_QUERY_LENGTH {
            return Err(VerisiftError::QueryTooLong {
                len,
                max: MAX_QUERY_LENGTH,
            });
        }
        Ok(Self(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased query words longer than three characters.
    #[must_use]
    pub fn keywords(&self) -> Vec<String> {
        extract_keywords(&self.0)
    }
}

/// Truth value of a verification. Serialized as `true`, `false` or `"unknown"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verified {
    True,
    False,
    Unknown,
}

impl Serialize for Verified {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::True => serializer.serialize_bool(true),
            Self::False => serializer.serialize_bool(false),
            Self::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

impl fmt::Display for Verified {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => f.write_str("true"),
            Self::False => f.write_str("false"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

impl<'de> Deserialize<'de> for Verified {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bool(bool),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Bool(true) => Ok(Self::True),
            Repr::Bool(false) => Ok(Self::False),
            Repr::Text(s) if s.eq_ignore_ascii_case("unknown") => Ok(Self::Unknown),
            Repr::Text(s) => Err(serde::de::Error::custom(format!(
                "invalid verification value: {s}"
            ))),
        }
    }
}

/// Where a supporting excerpt was found. Source, page and excerpt are
/// either all present or all absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Title of the catalog document.
    pub source: String,
    /// 1-based page number.
    pub page: u32,
    pub excerpt: String,
}

/// Outcome of one verification call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    query: String,
    verified: Verified,
    #[serde(flatten)]
    citation: Option<Citation>,
    summary: String,
    #[serde(default)]
    suggested_sources: Vec<String>,
}

impl VerificationResult {
    /// A passage was found. The truth value stays `Unknown`: locating a
    /// passage does not establish the claim's stance.
    #[must_use]
    pub fn found(query: &VerificationQuery, citation: Citation) -> Self {
        let summary = format!(
            "Information related to the query was found in an official document. \
             The claim appears to be addressed on page {}.",
            citation.page
        );
        Self {
            query: query.as_str().to_string(),
            verified: Verified::Unknown,
            citation: Some(citation),
            summary,
            suggested_sources: Vec::new(),
        }
    }

    /// No candidate document yielded an excerpt.
    #[must_use]
    pub fn exhausted(query: &VerificationQuery, suggested_sources: Vec<String>) -> Self {
        Self {
            query: query.as_str().to_string(),
            verified: Verified::Unknown,
            citation: None,
            summary: "The query could not be verified using the available official documents. \
                      It is recommended to check the following official sources directly."
                .to_string(),
            suggested_sources,
        }
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn verified(&self) -> Verified {
        self.verified
    }

    #[must_use]
    pub fn citation(&self) -> Option<&Citation> {
        self.citation.as_ref()
    }

    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    #[must_use]
    pub fn suggested_sources(&self) -> &[String] {
        &self.suggested_sources
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Verisift system.
///
/// Adapter failures are not errors at this level: they are contained and
/// turned into `Unavailable` outcomes. Only input validation and
/// process-level problems are reported here.
#[derive(Debug, Error)]
pub enum VerisiftError {
    /// Text to analyse is empty or whitespace.
    #[error("Text cannot be empty")]
    EmptyText,

    /// Text to analyse exceeds the size limit.
    #[error("Text length {len} exceeds maximum {max} bytes")]
    TextTooLong { len: usize, max: usize },

    /// Verification query is below the minimum length.
    #[error("Query length {len} is below minimum {min} characters")]
    QueryTooShort { len: usize, min: usize },

    /// Verification query exceeds the size limit.
    #[error("Query length {len} exceeds maximum {max} characters")]
    QueryTooLong { len: usize, max: usize },

    /// A locator submitted for extraction is not a usable URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A text producer returned nothing to analyse.
    #[error("No readable text could be extracted from the input")]
    NoExtractableText,

    /// An uploaded file is missing, empty or too large.
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// No text producer is installed for this kind of input.
    #[error("No text source is configured for {0} input")]
    NoTextSource(Provenance),

    /// Configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl VerisiftError {
    /// True for errors caused by the caller's input.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyText
                | Self::TextTooLong { .. }
                | Self::QueryTooShort { .. }
                | Self::QueryTooLong { .. }
                | Self::InvalidUrl(_)
                | Self::NoExtractableText
                | Self::InvalidUpload(_)
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
