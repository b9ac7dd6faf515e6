// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The search engine: one call, four stages, two paths.
//!
//! ```text
//! Query ──▶ collection ──▶ title ──▶ heading ──▶ success?
//!                                                  │yes        │no
//!                                                  ▼            ▼
//!                                             Primary      Fallback engine
//!                                                  │       (A, then/plus B)
//!                                                  └──────┬───────┘
//!                                                         ▼
//!                                             semantic rerank (≤ 1 pass)
//!                                                         ▼
//!                                              hierarchical filter
//!                                                         ▼
//!                                                  SearchResponse
//! ```
//!
//! The primary pipeline is strictly sequential - every stage is cheap next
//! to the embedding call it gates. Primary and fallback results never mix:
//! when the success condition fails, primary hits are discarded outright.
//! Whichever path wins, reranking runs at most once, enforced by
//! [`RerankBudget`] rather than by the shape of the branching.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::corpus::Corpus;
use crate::error::Result;
use crate::fallback;
use crate::matching::{match_headings, match_titles, primary_success, select_collections};
use crate::merge::filter_hits;
use crate::rerank::{rerank, Embedder, RerankBudget};
use crate::types::{
    PageHit, Query, SearchOutcome, SearchPath, SearchResponse, SearchStats, Strategy,
};

/// Stateless per-corpus search orchestrator.
///
/// Holds a borrowed corpus, a validated config, and optionally the
/// injected embedding capability. All per-call state (scores, budget,
/// stats) is ephemeral inside [`search`](Self::search), so one engine may
/// serve concurrent calls.
pub struct SearchEngine<'c> {
    corpus: &'c Corpus,
    config: SearchConfig,
    embedder: Option<Arc<dyn Embedder>>,
}

impl<'c> SearchEngine<'c> {
    /// Build an engine over a corpus. Fails on invalid config.
    pub fn new(corpus: &'c Corpus, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(SearchEngine {
            corpus,
            config,
            embedder: None,
        })
    }

    /// Builder: inject the semantic-similarity capability.
    ///
    /// Without one, searches are lexical-only and semantic scores stay
    /// unset - the pipeline's own degradation mode.
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run one search call.
    ///
    /// Never fails: every outcome, including an empty corpus and both
    /// fallback strategies coming up dry, is a well-formed
    /// [`SearchResponse`].
    pub fn search(&self, query: &Query) -> SearchResponse {
        let start = Instant::now();
        let mut pages_scored = 0usize;
        let mut headings_scored = 0usize;

        let collections = select_collections(self.corpus, query, &self.config);
        if collections.is_empty() {
            debug!("no collection resolvable, returning empty response");
            return empty_response(start, Vec::new());
        }

        // Title stage: every page title in the selected collections.
        pages_scored += collections.iter().map(|d| d.pages().len()).sum::<usize>();
        let title_matches = match_titles(&collections, query, &self.config);
        debug!(candidates = title_matches.len(), "title stage done");

        // Heading stage: every heading on every title-matched page.
        headings_scored += title_matches
            .iter()
            .map(|tm| tm.page.headings.len())
            .sum::<usize>();
        let primary_hits = match_headings(&title_matches, query, &self.config);

        let outcome = if primary_success(&primary_hits, &self.config) {
            debug!(pages = primary_hits.len(), "primary path succeeded");
            SearchOutcome::Primary(primary_hits)
        } else {
            // Primary results are discarded, not merged with fallback.
            debug!(
                pages = primary_hits.len(),
                "primary success condition failed, engaging fallback"
            );
            let fb = fallback::run(&collections, query, &self.config);
            headings_scored += fb.headings_scored;
            SearchOutcome::Fallback {
                hits: fb.hits,
                strategies: fb.strategies,
            }
        };

        let strategies = match &outcome {
            SearchOutcome::Primary(_) => Vec::new(),
            SearchOutcome::Fallback { strategies, .. } => strategies.clone(),
        };

        // Rerank whichever path won - never both, at most once.
        let budget = RerankBudget::new();
        let mut rerank_calls = 0u32;
        let outcome = match &self.embedder {
            Some(embedder) if !outcome.hits().is_empty() => {
                rerank_calls = 1;
                let (hits, rebuild): (Vec<PageHit>, _) = match outcome {
                    SearchOutcome::Primary(hits) => (hits, None),
                    SearchOutcome::Fallback { hits, strategies } => (hits, Some(strategies)),
                };
                let reranked =
                    match rerank(hits, query, &self.config, embedder.as_ref(), &budget) {
                        Ok(reranked) => reranked,
                        Err(err) => {
                            // Unreachable from this single call site; keep
                            // the lexical results rather than dropping them.
                            warn!(error = %err, "rerank pass refused");
                            Vec::new()
                        }
                    };
                match rebuild {
                    None => SearchOutcome::Primary(reranked),
                    Some(strategies) => SearchOutcome::Fallback {
                        hits: reranked,
                        strategies,
                    },
                }
            }
            _ => outcome,
        };

        // Final pass, whichever path: collapse nested headings.
        let mut results = filter_hits(match outcome {
            SearchOutcome::Primary(hits) => hits,
            SearchOutcome::Fallback { hits, .. } => hits,
        });
        sort_results(&mut results);

        let path = if results.is_empty() {
            SearchPath::NoMatch
        } else if strategies.is_empty() {
            SearchPath::Primary
        } else {
            SearchPath::Fallback
        };

        SearchResponse {
            success: !results.is_empty(),
            results,
            stats: SearchStats {
                elapsed_micros: start.elapsed().as_micros() as u64,
                pages_scored,
                headings_scored,
                rerank_calls,
                path,
                strategies_attempted: strategies,
            },
        }
    }
}

/// Deterministic result order: best page first, ties alphabetical.
fn sort_results(results: &mut [PageHit]) {
    results.sort_by(|a, b| {
        b.best_score()
            .partial_cmp(&a.best_score())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.page_title.cmp(&b.page_title))
            .then_with(|| a.doc_set.cmp(&b.doc_set))
    });
}

fn empty_response(start: Instant, strategies: Vec<Strategy>) -> SearchResponse {
    SearchResponse {
        success: false,
        results: Vec::new(),
        stats: SearchStats {
            elapsed_micros: start.elapsed().as_micros() as u64,
            pages_scored: 0,
            headings_scored: 0,
            rerank_calls: 0,
            path: SearchPath::NoMatch,
            strategies_attempted: strategies,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::DocSet;
    use crate::types::{DocSetId, Heading};

    fn corpus() -> Corpus {
        Corpus::from_doc_sets(vec![DocSet::from_pages(
            DocSetId::new("docs", "latest"),
            "toc.md",
            vec![
                (
                    "Hooks reference",
                    vec![
                        Heading::new(2, "Configure hooks"),
                        Heading::new(2, "Disable hooks"),
                        Heading::new(2, "Server rendering"),
                    ],
                ),
                (
                    "Operations guide",
                    vec![
                        Heading::new(2, "Production Considerations"),
                        Heading::new(2, "Local development"),
                    ],
                ),
            ],
        )])
    }

    #[test]
    fn test_primary_path_success() {
        let corpus = corpus();
        let engine = SearchEngine::new(&corpus, SearchConfig::new(0.5)).unwrap();
        let response = engine.search(&Query::from_variants([
            "hooks reference",
            "configure hooks",
        ]));

        assert!(response.success);
        assert_eq!(response.stats.path, SearchPath::Primary);
        assert!(response.stats.strategies_attempted.is_empty());
        assert_eq!(response.results[0].page_title, "Hooks reference");
    }

    #[test]
    fn test_fallback_path_on_title_miss() {
        let corpus = corpus();
        let engine = SearchEngine::new(&corpus, SearchConfig::new(0.5)).unwrap();
        // No title clears 0.6, but the keyword grep finds the heading.
        let response = engine.search(&Query::new("deployment considerations for production"));

        assert!(response.success);
        assert_eq!(response.stats.path, SearchPath::Fallback);
        assert!(!response.stats.strategies_attempted.is_empty());
        assert_eq!(response.results[0].page_title, "Operations guide");
    }

    #[test]
    fn test_no_match_reports_strategies() {
        let corpus = corpus();
        let engine = SearchEngine::new(&corpus, SearchConfig::new(0.5)).unwrap();
        let response = engine.search(&Query::new("kubernetes ingress controllers"));

        assert!(!response.success);
        assert!(response.results.is_empty());
        assert_eq!(response.stats.path, SearchPath::NoMatch);
        assert_eq!(
            response.stats.strategies_attempted,
            vec![Strategy::IndexGrep, Strategy::ContextGrep]
        );
    }

    #[test]
    fn test_empty_corpus_is_not_an_error() {
        let corpus = Corpus::default();
        let engine = SearchEngine::new(&corpus, SearchConfig::new(0.5)).unwrap();
        let response = engine.search(&Query::new("anything"));
        assert!(!response.success);
        assert!(response.results.is_empty());
        assert_eq!(response.stats.path, SearchPath::NoMatch);
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let corpus = corpus();
        assert!(SearchEngine::new(&corpus, SearchConfig::new(2.0)).is_err());
    }

    #[test]
    fn test_lexical_only_without_embedder() {
        let corpus = corpus();
        let engine = SearchEngine::new(&corpus, SearchConfig::new(0.5)).unwrap();
        let response = engine.search(&Query::new("hooks configuration"));
        assert_eq!(response.stats.rerank_calls, 0);
        for hit in &response.results {
            assert!(hit.headings.iter().all(|h| h.semantic_score.is_none()));
        }
    }
}
