//! # Innate Primitives
//!
//! Hardcoded decision constants for the Verisift CORE.
//!
//! These values are compiled into the binary and are immutable at runtime.
//! They define when the classifier is trusted, when an excerpt is good
//! enough to cite, and the bounds every input must respect.

/// Texts with fewer words than this are always sent to the fallback.
///
/// Short texts carry too few features for the classifier, regardless of
/// the confidence it reports.
pub const SHORT_TEXT_WORDS: usize = 20;

/// Minimum classifier confidence (inclusive) for the classifier to be trusted.
pub const CONFIDENCE_THRESHOLD: u8 = 80;

/// Upper bound of every confidence value.
pub const MAX_CONFIDENCE: u8 = 100;

/// Minimum number of distinct query keywords a sentence must contain
/// before it can be cited as an excerpt.
pub const MIN_KEYWORD_MATCHES: usize = 2;

/// Query words must be strictly longer than this (in characters) to count
/// as keywords.
pub const MIN_KEYWORD_CHARS: usize = 3;

/// Minimum length of a verification query, in characters.
pub const MIN_QUERY_LENGTH: usize = 10;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length of text submitted for analysis (256 KB).
///
/// Longer inputs are rejected before any adapter is called.
pub const MAX_TEXT_LENGTH: usize = 262_144;

/// Maximum length of a verification query, in characters.
pub const MAX_QUERY_LENGTH: usize = 4096;

/// Maximum size of an uploaded image or audio file (10 MB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
