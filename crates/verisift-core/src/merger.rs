//! # Verdict Merger
//!
//! Combines the classifier outcome and the (optional) fallback outcome into
//! one `FinalVerdict`.
//!
//! The two opinions are never blended numerically. One supersedes the other:
//! - Fallback invoked, available, and not `Unknown` → fallback wins
//! - Otherwise an available classifier wins
//! - Otherwise the verdict is `Error`

use crate::types::{ClassifierOutcome, FallbackLabel, FallbackOutcome, FinalVerdict};

/// Merge the opinions gathered for one request.
///
/// `fallback` is `None` when the decision policy did not invoke the fallback.
#[must_use]
pub fn merge(classifier: &ClassifierOutcome, fallback: Option<&FallbackOutcome>) -> FinalVerdict {
    let authoritative_fallback = fallback
        .and_then(FallbackOutcome::verdict)
        .filter(|v| v.verdict != FallbackLabel::Unknown);

    if let Some(fallback_verdict) = authoritative_fallback {
        let highlighted = classifier
            .verdict()
            .map(|v| v.highlighted.clone())
            .unwrap_or_default();
        return FinalVerdict::from_fallback(fallback_verdict, highlighted);
    }

    match classifier.verdict() {
        Some(classifier_verdict) => FinalVerdict::from_classifier(classifier_verdict),
        None => FinalVerdict::error(unusable_explanation(classifier, fallback)),
    }
}

/// Explanation for the `Error` verdict, naming what each opinion source reported.
fn unusable_explanation(classifier: &ClassifierOutcome, fallback: Option<&FallbackOutcome>) -> String {
    let classifier_reason = match classifier {
        ClassifierOutcome::Unavailable { reason } => reason.as_str(),
        ClassifierOutcome::Available(_) => "available",
    };
    let fallback_reason = match fallback {
        None => "not invoked".to_string(),
        Some(FallbackOutcome::Unavailable { reason }) => reason.clone(),
        Some(FallbackOutcome::Available(v)) => format!("no verdict ({})", v.explanation),
    };
    format!(
        "No usable verdict. Classifier: {classifier_reason}. Fallback: {fallback_reason}."
    )
}
