// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The fallback engine: two escalating strategies over raw TOC text.
//!
//! Triggered only when the primary pipeline misses its success condition.
//! Both strategies re-derive candidate headings straight from the TOC
//! files - [`index_grep`] matches heading lines themselves, [`context_grep`]
//! matches any line and attributes it to the nearest preceding heading
//! within a context window. Each strategy re-scores its own candidates
//! with the same BM25 model (stemming on) and the same basic/precision
//! thresholds the primary heading stage uses.
//!
//! Execution modes:
//!
//! - **Serial** (default): index-grep first; context-grep only if it came
//!   up empty.
//! - **Parallel**: both run concurrently as pure reads over the immutable
//!   corpus, are *joined* - never raced - and their outputs go through the
//!   commutative merge regardless of which finished first.

pub mod context_grep;
pub mod index_grep;

use std::collections::HashSet;

use tracing::debug;

use crate::config::{FallbackMode, SearchConfig};
use crate::corpus::DocSet;
use crate::merge::merge_hits;
use crate::scoring::{LexicalScorer, Population};
use crate::text::{extract_keywords, tokenize_stemmed};
use crate::types::{PageHit, Query, ScoredHeading, Strategy};

/// What a fallback run produced, and what it tried to get there.
#[derive(Debug, Clone)]
pub struct FallbackOutcome {
    /// Scored (and, in parallel mode, merged) page hits.
    pub hits: Vec<PageHit>,
    /// Strategies executed, in attempt order.
    pub strategies: Vec<Strategy>,
    /// Candidate headings re-scored across the run.
    pub headings_scored: usize,
}

/// Run the fallback engine in the configured mode.
pub fn run(collections: &[&DocSet], query: &Query, config: &SearchConfig) -> FallbackOutcome {
    let keywords = collect_keywords(query);
    if keywords.is_empty() {
        return FallbackOutcome {
            hits: Vec::new(),
            strategies: Vec::new(),
            headings_scored: 0,
        };
    }
    debug!(?keywords, mode = ?config.fallback_mode, "fallback engaged");

    match config.fallback_mode {
        FallbackMode::Serial => {
            let (a_hits, a_scored) = index_grep::run(collections, &keywords, query, config);
            if !a_hits.is_empty() {
                return FallbackOutcome {
                    hits: a_hits,
                    strategies: vec![Strategy::IndexGrep],
                    headings_scored: a_scored,
                };
            }
            let (b_hits, b_scored) = context_grep::run(collections, &keywords, query, config);
            FallbackOutcome {
                hits: b_hits,
                strategies: vec![Strategy::IndexGrep, Strategy::ContextGrep],
                headings_scored: a_scored + b_scored,
            }
        }
        FallbackMode::Parallel => {
            let ((a_hits, a_scored), (b_hits, b_scored)) = join_strategies(
                || index_grep::run(collections, &keywords, query, config),
                || context_grep::run(collections, &keywords, query, config),
            );
            FallbackOutcome {
                hits: merge_hits(a_hits, b_hits),
                strategies: vec![Strategy::IndexGrep, Strategy::ContextGrep],
                headings_scored: a_scored + b_scored,
            }
        }
    }
}

/// Run both strategy closures, waiting for both to complete.
#[cfg(feature = "parallel")]
fn join_strategies<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    rayon::join(a, b)
}

/// Sequential stand-in when the `parallel` feature is off. Same join
/// semantics: both run to completion before merging.
#[cfg(not(feature = "parallel"))]
fn join_strategies<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    (a(), b())
}

/// Core keywords across every query variant, order-preserving.
fn collect_keywords(query: &Query) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keywords = Vec::new();
    for variant in &query.variants {
        for kw in extract_keywords(variant) {
            if seen.insert(kw.clone()) {
                keywords.push(kw);
            }
        }
    }
    keywords
}

/// A heading recovered from a raw TOC scan, before re-scoring.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawCandidate<'c> {
    pub doc_set: &'c DocSet,
    pub page_idx: usize,
    pub heading_idx: usize,
}

/// Re-score raw candidates and group survivors into page hits.
///
/// The IDF population is the candidate set of this call, matching how the
/// primary stages scope their statistics. Returns the hits plus how many
/// candidates were scored.
pub(crate) fn score_candidates(
    candidates: Vec<RawCandidate<'_>>,
    query: &Query,
    config: &SearchConfig,
) -> (Vec<PageHit>, usize) {
    if candidates.is_empty() {
        return (Vec::new(), 0);
    }

    let scorer = LexicalScorer::new(config.k1, config.b);
    let variant_tokens: Vec<Vec<String>> = query
        .variants
        .iter()
        .map(|v| tokenize_stemmed(v))
        .collect();

    let candidate_tokens: Vec<Vec<String>> = candidates
        .iter()
        .map(|c| {
            let heading = &c.doc_set.pages()[c.page_idx].headings[c.heading_idx];
            tokenize_stemmed(&heading.text)
        })
        .collect();
    let population = Population::from_candidates(candidate_tokens.iter());
    let scored_count = candidates.len();

    let mut hits: Vec<PageHit> = Vec::new();
    for (candidate, tokens) in candidates.iter().zip(&candidate_tokens) {
        let score = variant_tokens
            .iter()
            .map(|q| scorer.score(q, tokens, &population))
            .fold(0.0, f64::max);
        if score < config.threshold_heading {
            continue;
        }

        let page = &candidate.doc_set.pages()[candidate.page_idx];
        let heading = &page.headings[candidate.heading_idx];
        let scored = ScoredHeading {
            level: heading.level,
            text: heading.text.clone(),
            line: page.heading_lines[candidate.heading_idx],
            lexical_score: score,
            semantic_score: None,
            precision: score >= config.threshold_precision,
        };

        let doc_set_id = candidate.doc_set.id();
        let hit = hits
            .iter_mut()
            .find(|h| h.doc_set == *doc_set_id && h.page_title == page.title);
        match hit {
            Some(hit) => {
                // A heading text appears at most once per page entry.
                match hit.headings.iter_mut().find(|h| h.text == scored.text) {
                    Some(existing) => {
                        if scored.lexical_score > existing.lexical_score {
                            if scored.precision && !existing.precision {
                                hit.precision_count += 1;
                            }
                            *existing = scored;
                        }
                    }
                    None => {
                        hit.heading_count += 1;
                        if scored.precision {
                            hit.precision_count += 1;
                        }
                        hit.headings.push(scored);
                    }
                }
            }
            None => {
                hits.push(PageHit {
                    doc_set: doc_set_id.clone(),
                    page_title: page.title.clone(),
                    toc_reference: page.toc_reference.clone(),
                    heading_count: 1,
                    precision_count: usize::from(scored.precision),
                    headings: vec![scored],
                });
            }
        }
    }

    for hit in &mut hits {
        hit.headings.sort_by_key(|h| h.line);
    }
    (hits, scored_count)
}

/// Case-insensitive "does this line mention any keyword?".
pub(crate) fn line_matches(line_lower: &str, keywords_lower: &[String]) -> bool {
    keywords_lower.iter().any(|kw| line_lower.contains(kw))
}
