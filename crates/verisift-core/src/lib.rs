//! # verisift-core
//!
//! The deterministic decision logic for Verisift - THE LOGIC.
//!
//! This crate decides, but never calls out. Given what the external
//! adapters produced, it answers:
//! - whether the language-model fallback must be consulted (`policy`)
//! - which opinion becomes the final verdict (`merger`)
//! - which sentence of a document best supports a query (`relevance`)
//! - which curated documents are candidates for a query (`catalog`)
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Has NO async, NO network dependencies (pure Rust)
//! - Never mutates its inputs; every artifact is immutable once built
//! - Treats adapter failure as data (`Unavailable` outcomes), not as errors

// =============================================================================
// MODULES
// =============================================================================

pub mod catalog;
pub mod merger;
pub mod policy;
pub mod primitives;
pub mod relevance;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    AnalysisRequest, Citation, ClassifierLabel, ClassifierOutcome, ClassifierVerdict, Confidence,
    EvidenceItem, EvidenceResult, EvidenceStatus, FallbackLabel, FallbackOutcome,
    FallbackVerdict, FinalAnalysisResponse, FinalLabel, FinalVerdict, Provenance,
    VerdictSource, VerificationQuery, VerificationResult, Verified, VerisiftError,
};

// =============================================================================
// RE-EXPORTS: Decision Logic
// =============================================================================

pub use catalog::{CatalogEntry, DocumentCatalog};
pub use merger::merge;
pub use policy::{FallbackDecision, fallback_decision, needs_fallback, word_count};
pub use relevance::{PageMatch, extract_keywords, score_best_sentence, search_pages};
