//! # Fallback Decision Policy
//!
//! Decides whether the classifier's opinion can stand on its own or the
//! language-model fallback must be consulted.
//!
//! Rules, first match wins:
//! 1. Classifier unavailable → fallback
//! 2. Fewer than `SHORT_TEXT_WORDS` words → fallback
//! 3. Confidence ≥ `CONFIDENCE_THRESHOLD` and verdict not `Uncertain` → no fallback
//! 4. Otherwise → fallback

use crate::primitives::{CONFIDENCE_THRESHOLD, SHORT_TEXT_WORDS};
use crate::types::{ClassifierLabel, ClassifierOutcome};
use std::fmt;

/// Why the fallback is (or is not) required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackDecision {
    /// The classifier is trusted.
    NotRequired,
    /// The classifier failed or produced nothing.
    ClassifierUnavailable,
    /// The text is too short for the classifier to be reliable.
    ShortText { words: usize },
    /// The classifier said `Uncertain`.
    UncertainVerdict,
    /// The classifier's confidence is below the threshold.
    LowConfidence { confidence: u8 },
}

impl FallbackDecision {
    #[must_use]
    pub fn is_required(self) -> bool {
        self != Self::NotRequired
    }
}

impl fmt::Display for FallbackDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRequired => f.write_str("classifier trusted"),
            Self::ClassifierUnavailable => f.write_str("classifier unavailable"),
            Self::ShortText { words } => write!(f, "short text ({words} words)"),
            Self::UncertainVerdict => f.write_str("classifier uncertain"),
            Self::LowConfidence { confidence } => write!(f, "low confidence ({confidence}%)"),
        }
    }
}

/// Number of whitespace-separated words in `text`.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Evaluate the policy and report which rule fired.
#[must_use]
pub fn fallback_decision(text: &str, classifier: &ClassifierOutcome) -> FallbackDecision {
    let Some(verdict) = classifier.verdict() else {
        return FallbackDecision::ClassifierUnavailable;
    };

    let words = word_count(text);
    if words < SHORT_TEXT_WORDS {
        return FallbackDecision::ShortText { words };
    }

    let confidence = verdict.confidence.value();
    if confidence >= CONFIDENCE_THRESHOLD && verdict.verdict != ClassifierLabel::Uncertain {
        return FallbackDecision::NotRequired;
    }

    if verdict.verdict == ClassifierLabel::Uncertain {
        FallbackDecision::UncertainVerdict
    } else {
        FallbackDecision::LowConfidence { confidence }
    }
}

/// True when the fallback adapter must be consulted.
#[must_use]
pub fn needs_fallback(text: &str, classifier: &ClassifierOutcome) -> bool {
    fallback_decision(text, classifier).is_required()
}
