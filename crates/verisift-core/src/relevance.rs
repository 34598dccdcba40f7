//! # Relevance Scorer
//!
//! Picks the sentence of a page that best matches a set of query keywords.
//!
//! - Sentences end at `.` or `?` followed by whitespace
//! - Single-letter abbreviations (`U.S.`, `e.g.`) and short titles (`Dr.`)
//!   do not end a sentence
//! - Score = number of keywords occurring as case-insensitive substrings
//! - Ties keep the earliest sentence; fewer than `MIN_KEYWORD_MATCHES` → none

use crate::primitives::{MIN_KEYWORD_CHARS, MIN_KEYWORD_MATCHES};
use std::collections::BTreeMap;

/// A qualifying excerpt and the page it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMatch {
    pub page: u32,
    pub excerpt: String,
}

/// Lower-cased words of `query` longer than `MIN_KEYWORD_CHARS` characters.
#[must_use]
pub fn extract_keywords(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() > MIN_KEYWORD_CHARS)
        .map(str::to_string)
        .collect()
}

/// Split `text` into sentences. The separating whitespace character is dropped;
/// sentences are returned untrimmed.
#[must_use]
pub fn split_sentences(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;

    for pos in 1..chars.len() {
        let (byte_idx, ch) = chars[pos];
        if !ch.is_whitespace() {
            continue;
        }
        let prev = chars[pos - 1].1;
        if prev != '.' && prev != '?' {
            continue;
        }
        if ends_with_abbreviation(&chars[..pos]) {
            continue;
        }
        sentences.push(&text[start..byte_idx]);
        start = byte_idx + ch.len_utf8();
    }

    sentences.push(&text[start..]);
    sentences
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True when the terminator at the end of `before` belongs to an abbreviation:
/// `x.y.` (single letters) or `Xy.` (capitalised two-letter title).
fn ends_with_abbreviation(before: &[(usize, char)]) -> bool {
    let n = before.len();
    if n >= 4 {
        let (a, b, c) = (before[n - 4].1, before[n - 3].1, before[n - 2].1);
        if is_word_char(a) && b == '.' && is_word_char(c) {
            return true;
        }
    }
    if n >= 3 {
        let (a, b, c) = (before[n - 3].1, before[n - 2].1, before[n - 1].1);
        if a.is_ascii_uppercase() && b.is_ascii_lowercase() && c == '.' {
            return true;
        }
    }
    false
}

/// Number of `keywords` occurring in `sentence`, case-insensitively.
#[must_use]
pub fn keyword_hits(sentence: &str, keywords: &[String]) -> usize {
    let lowered = sentence.to_lowercase();
    keywords
        .iter()
        .filter(|k| lowered.contains(k.as_str()))
        .count()
}

/// Best-matching sentence of `page_text`, or `None` when no sentence reaches
/// `MIN_KEYWORD_MATCHES` keywords.
#[must_use]
pub fn score_best_sentence(page_text: &str, keywords: &[String]) -> Option<String> {
    let mut best: Option<&str> = None;
    let mut max_hits = 0;

    for sentence in split_sentences(page_text) {
        let hits = keyword_hits(sentence, keywords);
        if hits > max_hits {
            max_hits = hits;
            best = Some(sentence);
        }
    }

    if max_hits >= MIN_KEYWORD_MATCHES {
        best.map(|s| s.trim().to_string())
    } else {
        None
    }
}

/// Scan pages in ascending page order and return the first excerpt.
#[must_use]
pub fn search_pages(pages: &BTreeMap<u32, String>, keywords: &[String]) -> Option<PageMatch> {
    pages.iter().find_map(|(&page, text)| {
        score_best_sentence(text, keywords).map(|excerpt| PageMatch { page, excerpt })
    })
}
