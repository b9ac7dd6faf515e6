// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Title matching: which pages are worth opening?
//!
//! Titles are scored without stemming. A user typing "hooks" means hooks;
//! blurring it into "hook" trades the title signal's precision away for
//! nothing - morphology-tolerant matching is the heading stage's job.
//! IDF statistics come from the titles of the collection being scored, so
//! a term that is rare among this collection's pages is worth more here
//! than its corpus-wide frequency would suggest.

use crate::config::SearchConfig;
use crate::corpus::{DocSet, Page};
use crate::scoring::{LexicalScorer, Population};
use crate::text::tokenize;
use crate::types::Query;

/// A page whose title cleared the basic-match threshold.
#[derive(Debug, Clone, Copy)]
pub struct TitleMatch<'c> {
    /// The collection the page belongs to.
    pub doc_set: &'c DocSet,
    /// The matched page.
    pub page: &'c Page,
    /// Best title score across query variants.
    pub score: f64,
}

/// Score every page title in the selected collections; keep basic matches.
///
/// A page is a basic match when its best score across query variants is at
/// least `threshold_title`. Only basic matches proceed to heading matching.
pub fn match_titles<'c>(
    collections: &[&'c DocSet],
    query: &Query,
    config: &SearchConfig,
) -> Vec<TitleMatch<'c>> {
    let scorer = LexicalScorer::new(config.k1, config.b);
    let variant_tokens: Vec<Vec<String>> = query.variants.iter().map(|v| tokenize(v)).collect();

    let mut matches = Vec::new();
    for &doc_set in collections {
        let title_tokens: Vec<Vec<String>> = doc_set
            .pages()
            .iter()
            .map(|p| tokenize(&p.title))
            .collect();
        let population = Population::from_candidates(title_tokens.iter());

        for (page, tokens) in doc_set.pages().iter().zip(&title_tokens) {
            let score = variant_tokens
                .iter()
                .map(|q| scorer.score(q, tokens, &population))
                .fold(0.0, f64::max);
            if score >= config.threshold_title {
                matches.push(TitleMatch {
                    doc_set,
                    page,
                    score,
                });
            }
        }
    }
    matches
}
