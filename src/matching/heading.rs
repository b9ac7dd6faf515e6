// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Heading matching and the primary-path success condition.
//!
//! Headings are scored with stemming enabled - "Configuring hooks" should
//! match a query about "hook configuration". Two thresholds apply: basic
//! (`threshold_heading`) admits a heading into the result, precision
//! (`threshold_precision`) marks it strong enough to count toward the
//! success condition. IDF statistics come from the headings of the page
//! being scored.
//!
//! A page keeps its place only with at least `min_headings` basic matches,
//! and the primary path as a whole succeeds only when enough pages survive
//! AND at least one heading anywhere is a precision match. A pile of weak
//! matches is exactly the situation the fallback engine exists for.

use crate::config::SearchConfig;
use crate::matching::title::TitleMatch;
use crate::scoring::{LexicalScorer, Population};
use crate::text::tokenize_stemmed;
use crate::types::{PageHit, Query, ScoredHeading};

/// Score the headings of every title-matched page; keep surviving pages.
///
/// Within a page, a heading text appears at most once: when duplicate
/// heading texts both match, the higher-scoring occurrence wins.
pub fn match_headings(
    title_matches: &[TitleMatch<'_>],
    query: &Query,
    config: &SearchConfig,
) -> Vec<PageHit> {
    let scorer = LexicalScorer::new(config.k1, config.b);
    let variant_tokens: Vec<Vec<String>> = query
        .variants
        .iter()
        .map(|v| tokenize_stemmed(v))
        .collect();

    let mut hits = Vec::new();
    for tm in title_matches {
        let heading_tokens: Vec<Vec<String>> = tm
            .page
            .headings
            .iter()
            .map(|h| tokenize_stemmed(&h.text))
            .collect();
        let population = Population::from_candidates(heading_tokens.iter());

        let mut scored: Vec<ScoredHeading> = Vec::new();
        for (idx, (heading, tokens)) in tm.page.headings.iter().zip(&heading_tokens).enumerate() {
            let score = variant_tokens
                .iter()
                .map(|q| scorer.score(q, tokens, &population))
                .fold(0.0, f64::max);
            if score < config.threshold_heading {
                continue;
            }

            let candidate = ScoredHeading {
                level: heading.level,
                text: heading.text.clone(),
                line: tm.page.heading_lines[idx],
                lexical_score: score,
                semantic_score: None,
                precision: score >= config.threshold_precision,
            };

            match scored.iter_mut().find(|s| s.text == candidate.text) {
                Some(existing) => {
                    if candidate.lexical_score > existing.lexical_score {
                        *existing = candidate;
                    }
                }
                None => scored.push(candidate),
            }
        }

        if scored.len() < config.min_headings {
            continue;
        }

        let precision_count = scored.iter().filter(|h| h.precision).count();
        hits.push(PageHit {
            doc_set: tm.doc_set.id().clone(),
            page_title: tm.page.title.clone(),
            toc_reference: tm.page.toc_reference.clone(),
            heading_count: scored.len(),
            precision_count,
            headings: scored,
        });
    }
    hits
}

/// The primary-path success condition: enough pages survived and at least
/// one heading anywhere is a precision match.
pub fn primary_success(hits: &[PageHit], config: &SearchConfig) -> bool {
    hits.len() >= config.min_pages && hits.iter().any(PageHit::has_precision)
}
