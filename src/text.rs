// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Text processing: normalization, tokenization, keyword extraction, and
//! TOC-line parsing.
//!
//! Three tokenization flavors coexist on purpose:
//!
//! - [`tokenize`] - lowercase word tokens, stop words removed. Used for
//!   title scoring, where exact phrasing matters and stemming would blur
//!   "hooks" into "hook".
//! - [`tokenize_stemmed`] - same, plus Snowball stemming. Used for heading
//!   and fallback scoring, where morphology gets in the way.
//! - [`extract_keywords`] - the fallback grep vocabulary: stop words out,
//!   technical acronyms preserved verbatim, everything else stemmed to its
//!   root form.
//!
//! Keep the flavors straight. Scoring a candidate tokenized one way against
//! a query tokenized another silently zeroes the overlap.

use std::collections::HashSet;
use std::sync::OnceLock;

use rust_stemmers::{Algorithm, Stemmer};

use crate::types::Heading;

#[cfg(feature = "unicode-normalization")]
use unicode_normalization::UnicodeNormalization;

// =============================================================================
// NORMALIZATION
// =============================================================================

/// Normalize a string for comparison: lowercase, strip diacritics, and
/// collapse whitespace.
///
/// # Algorithm (with unicode-normalization feature)
///
/// 1. NFD normalize (decompose characters into base + combining marks)
/// 2. Filter out combining marks (category Mn = Mark, Nonspacing)
/// 3. Lowercase
/// 4. Collapse whitespace
#[cfg(feature = "unicode-normalization")]
pub fn normalize(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lightweight normalization without the unicode-normalization dependency.
/// Just lowercases and collapses whitespace.
#[cfg(not(feature = "unicode-normalization"))]
pub fn normalize(value: &str) -> String {
    value
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Check if a character is a combining mark (diacritic).
#[cfg(feature = "unicode-normalization")]
fn is_combining_mark(c: char) -> bool {
    matches!(c,
        '\u{0300}'..='\u{036F}' |  // Combining Diacritical Marks
        '\u{1DC0}'..='\u{1DFF}' |  // Combining Diacritical Marks Supplement
        '\u{20D0}'..='\u{20FF}' |  // Combining Diacritical Marks for Symbols
        '\u{FE20}'..='\u{FE2F}'    // Combining Half Marks
    )
}

// =============================================================================
// STOP WORDS
// =============================================================================

const STOP_WORD_LIST: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "can", "do", "does", "for", "from",
    "has", "have", "how", "i", "if", "in", "into", "is", "it", "its", "my", "no", "not", "of",
    "on", "or", "our", "should", "so", "that", "the", "their", "them", "then", "there", "these",
    "they", "this", "to", "up", "use", "was", "we", "what", "when", "where", "which", "who",
    "why", "will", "with", "you", "your",
];

/// The fixed stop-word table, built once.
fn stop_words() -> &'static HashSet<&'static str> {
    static STOP_WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    STOP_WORDS.get_or_init(|| STOP_WORD_LIST.iter().copied().collect())
}

/// Whether a (lowercased) token is a stop word.
pub fn is_stop_word(token: &str) -> bool {
    stop_words().contains(token)
}

// =============================================================================
// TOKENIZATION
// =============================================================================

/// Tokenize into lowercase word tokens with stop words removed.
///
/// Splits on anything non-alphanumeric, so `snake_case` and `dotted.path`
/// fall apart into their pieces.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty() && !is_stop_word(t))
        .map(String::from)
        .collect()
}

/// Tokenize and stem. Only ASCII-alphabetic tokens are stemmed; mixed
/// tokens like `v2` or `utf8` pass through untouched.
pub fn tokenize_stemmed(text: &str) -> Vec<String> {
    let stemmer = Stemmer::create(Algorithm::English);
    tokenize(text)
        .into_iter()
        .map(|t| {
            if t.chars().all(|c| c.is_ascii_alphabetic()) {
                stemmer.stem(&t).to_string()
            } else {
                t
            }
        })
        .collect()
}

/// Alphabetic tokens, lowercased, as a set. The coarse vocabulary used for
/// Jaccard collection matching.
pub fn keyword_set(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Extract the core keywords of a query for fallback grepping.
///
/// Stop words are dropped. Tokens that appear fully upper-case in the
/// original (length >= 2) are technical acronyms and kept verbatim -
/// stemming "HTTP" or "JWT" would only destroy them. Everything else is
/// lowercased and reduced to its root form. Order-preserving, deduplicated.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let stemmer = Stemmer::create(Algorithm::English);
    let mut seen = HashSet::new();
    let mut keywords = Vec::new();

    for raw in text.split(|c: char| !c.is_alphanumeric()) {
        if raw.is_empty() {
            continue;
        }
        let lower = raw.to_lowercase();
        if is_stop_word(&lower) {
            continue;
        }

        let is_acronym = raw.len() >= 2 && raw.chars().all(|c| c.is_ascii_uppercase());
        let keyword = if is_acronym {
            raw.to_string()
        } else if lower.chars().all(|c| c.is_ascii_alphabetic()) {
            stemmer.stem(&lower).to_string()
        } else {
            lower
        };

        if seen.insert(keyword.clone()) {
            keywords.push(keyword);
        }
    }
    keywords
}

// =============================================================================
// LANGUAGE DETECTION
// =============================================================================

/// Whether a character belongs to the CJK ranges the reranker cares about.
fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}' |   // CJK Unified Ideographs
        '\u{3400}'..='\u{4DBF}' |   // CJK Extension A
        '\u{3040}'..='\u{30FF}' |   // Hiragana + Katakana
        '\u{AC00}'..='\u{D7AF}' |   // Hangul Syllables
        '\u{F900}'..='\u{FAFF}'     // CJK Compatibility Ideographs
    )
}

/// Ratio of CJK characters to total non-whitespace characters, in `[0, 1]`.
///
/// `0.0` for empty or all-whitespace input.
pub fn cjk_ratio(text: &str) -> f64 {
    let mut total = 0usize;
    let mut cjk = 0usize;
    for c in text.chars() {
        if c.is_whitespace() {
            continue;
        }
        total += 1;
        if is_cjk(c) {
            cjk += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        cjk as f64 / total as f64
    }
}

// =============================================================================
// TOC LINE PARSING
// =============================================================================

/// Parse one raw TOC line as a markdown heading.
///
/// Accepts 1-6 leading `#` characters followed by whitespace and heading
/// text. The text is cleaned before it becomes a [`Heading`]:
///
/// - inline markdown links are rewritten to their display text
///   (`[Setup](./setup.md)` becomes `Setup`)
/// - trailing bare URLs are stripped
/// - trailing `#` decoration (ATX closing style) is removed
///
/// Returns `None` for anything that is not a heading line.
pub fn parse_heading_line(line: &str) -> Option<Heading> {
    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.starts_with(char::is_whitespace) {
        // "#hashtag" is not a heading.
        return None;
    }

    let text = clean_heading_text(rest.trim());
    if text.is_empty() {
        return None;
    }
    Some(Heading::new(level as u8, text))
}

/// Clean heading text: rewrite inline links, strip trailing URLs and
/// closing-hash decoration, collapse whitespace.
pub fn clean_heading_text(raw: &str) -> String {
    let unlinked = rewrite_inline_links(raw);

    // Drop trailing ATX closing hashes: "## Setup ##" -> "Setup". The run
    // must be preceded by whitespace, or "Intro to C#" would lose its '#'.
    let trimmed = unlinked.trim_end();
    let stripped = trimmed.trim_end_matches('#');
    let without_hashes = if stripped.len() != trimmed.len()
        && (stripped.is_empty() || stripped.ends_with(char::is_whitespace))
    {
        stripped.trim_end()
    } else {
        trimmed
    };

    // Strip trailing bare URLs, token by token.
    let mut tokens: Vec<&str> = without_hashes.split_whitespace().collect();
    while let Some(last) = tokens.last() {
        if last.starts_with("http://") || last.starts_with("https://") {
            tokens.pop();
        } else {
            break;
        }
    }
    tokens.join(" ")
}

/// Rewrite `[display](url)` spans to their display text.
///
/// Plain brackets that do not form a link pass through untouched. A small
/// hand scan; headings are short and a full markdown parser is out of
/// scope here.
fn rewrite_inline_links(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'[' {
            if let Some((display, end)) = scan_link(raw, i) {
                out.push_str(display);
                i = end;
                continue;
            }
        }
        // Advance by one char, not one byte.
        let ch = raw[i..].chars().next().unwrap_or('\u{FFFD}');
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

/// Try to read `[display](url)` starting at byte `start` (which must be
/// `[`). Returns the display slice and the byte index just past `)`.
fn scan_link(raw: &str, start: usize) -> Option<(&str, usize)> {
    let close = raw[start..].find(']').map(|p| start + p)?;
    let after = close + 1;
    if !raw[after..].starts_with('(') {
        return None;
    }
    let paren_close = raw[after..].find(')').map(|p| after + p)?;
    Some((&raw[start + 1..close], paren_close + 1))
}
