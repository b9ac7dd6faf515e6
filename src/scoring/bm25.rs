// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! BM25 lexical scoring, normalized to `[0, 1]`.
//!
//! The term weighting is standard BM25:
//!
//! ```text
//! raw = Σ_term IDF(term) · tf·(k1+1) / (tf + k1·(1 − b + b·|cand|/avg_len))
//! IDF(term) = ln((N − df + 0.5) / (df + 0.5) + 1)
//! ```
//!
//! with `IDF` computed over the candidate population being scored in that
//! call - all titles in a collection, or all headings on a page. Raw BM25
//! is unbounded, so the thresholds the pipeline runs on need a
//! normalization: each term's tf component is capped at `1.0` (its value
//! for a single occurrence in an average-length candidate) and the sum is
//! divided by `Σ IDF(term)` over the query terms, with document frequency
//! floored at 1 inside the normalizer so absent terms weigh like rare
//! ones instead of drowning everything. The result is an IDF-weighted
//! coverage score - `1.0` means every query term is present at full
//! strength, `0.0` means none is, and rare terms count for more than
//! common ones.
//!
//! Deterministic and side-effect-free; call it from as many threads as
//! you like.

use std::collections::{HashMap, HashSet};

// =============================================================================
// POPULATION
// =============================================================================

/// Corpus-level statistics for one scoring call.
///
/// Built from the candidate set being scored - not from the whole corpus.
/// That keeps IDF meaningful per call: a term that is rare among a page's
/// headings is informative there even if it is common elsewhere.
#[derive(Debug, Clone, Default)]
pub struct Population {
    /// Number of candidates.
    total: usize,
    /// Candidates containing each term at least once.
    doc_freqs: HashMap<String, usize>,
    /// Mean candidate length in tokens.
    avg_len: f64,
}

impl Population {
    /// Collect statistics over tokenized candidates.
    pub fn from_candidates<'a, I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = &'a Vec<String>>,
    {
        let mut total = 0usize;
        let mut token_sum = 0usize;
        let mut doc_freqs: HashMap<String, usize> = HashMap::new();

        for tokens in candidates {
            total += 1;
            token_sum += tokens.len();
            let unique: HashSet<&String> = tokens.iter().collect();
            for term in unique {
                *doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }
        }

        let avg_len = if total == 0 {
            0.0
        } else {
            token_sum as f64 / total as f64
        };

        Population {
            total,
            doc_freqs,
            avg_len,
        }
    }

    /// IDF with the usual smoothing: `ln((N − df + 0.5)/(df + 0.5) + 1)`.
    pub fn idf(&self, term: &str) -> f64 {
        let df = self.doc_freqs.get(term).copied().unwrap_or(0) as f64;
        let n = self.total as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    /// IDF with document frequency floored at 1.
    ///
    /// Used when a term weights the normalizer rather than a match: a
    /// query term absent from the whole population carries out-of-
    /// vocabulary IDF, and letting it dominate the denominator would
    /// push every partial match toward zero. Flooring caps an absent
    /// term's weight at "rarest seen" level.
    pub fn idf_floored(&self, term: &str) -> f64 {
        let df = self.doc_freqs.get(term).copied().unwrap_or(0).max(1) as f64;
        let n = self.total as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    /// Number of candidates the population was built from.
    pub fn len(&self) -> usize {
        self.total
    }

    /// Whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

// =============================================================================
// SCORER
// =============================================================================

/// BM25 scorer with fixed `k1`/`b` parameters.
#[derive(Debug, Clone, Copy)]
pub struct LexicalScorer {
    k1: f64,
    b: f64,
}

impl Default for LexicalScorer {
    fn default() -> Self {
        LexicalScorer { k1: 1.2, b: 0.75 }
    }
}

impl LexicalScorer {
    /// A scorer with custom parameters.
    pub fn new(k1: f64, b: f64) -> Self {
        LexicalScorer { k1, b }
    }

    /// Score tokenized query terms against a tokenized candidate.
    ///
    /// Returns a value in `[0, 1]`; exactly `0.0` when no query term
    /// appears in the candidate (or either side is empty). Duplicate query
    /// terms are collapsed before scoring so they cannot double-weight the
    /// normalizer.
    pub fn score(
        &self,
        query_tokens: &[String],
        candidate_tokens: &[String],
        population: &Population,
    ) -> f64 {
        if query_tokens.is_empty() || candidate_tokens.is_empty() {
            return 0.0;
        }

        let doc_len = candidate_tokens.len() as f64;
        let avg_len = population.avg_len.max(1.0);

        let mut term_counts: HashMap<&str, usize> = HashMap::new();
        for term in candidate_tokens {
            *term_counts.entry(term.as_str()).or_insert(0) += 1;
        }

        let unique_query: Vec<&String> = {
            let mut seen = HashSet::new();
            query_tokens.iter().filter(|t| seen.insert(*t)).collect()
        };

        let mut raw = 0.0;
        let mut ideal = 0.0;
        for term in unique_query {
            // Matched terms always have df >= 1, so the floor only tames
            // the normalizer weight of absent terms.
            let idf = population.idf_floored(term);
            ideal += idf;

            let tf = term_counts.get(term.as_str()).copied().unwrap_or(0) as f64;
            if tf == 0.0 {
                continue;
            }

            let tf_component = (tf * (self.k1 + 1.0))
                / (tf + self.k1 * (1.0 - self.b + self.b * doc_len / avg_len));
            // Cap at the single-occurrence, average-length reference value.
            raw += idf * tf_component.min(1.0);
        }

        if ideal <= 0.0 {
            0.0
        } else {
            (raw / ideal).clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::tokenize;

    fn population(candidates: &[&str]) -> (Vec<Vec<String>>, Population) {
        let tokenized: Vec<Vec<String>> = candidates.iter().map(|c| tokenize(c)).collect();
        let pop = Population::from_candidates(tokenized.iter());
        (tokenized, pop)
    }

    #[test]
    fn test_score_zero_without_overlap() {
        let scorer = LexicalScorer::default();
        let (cands, pop) = population(&["server rendering", "hydration errors"]);
        let query = tokenize("hooks configuration");
        for cand in &cands {
            assert_eq!(scorer.score(&query, cand, &pop), 0.0);
        }
    }

    #[test]
    fn test_score_in_unit_range() {
        let scorer = LexicalScorer::default();
        let (cands, pop) = population(&[
            "configure hooks",
            "hooks reference",
            "server rendering",
            "deploy to production",
        ]);
        let query = tokenize("hooks configuration deploy");
        for cand in &cands {
            let s = scorer.score(&query, cand, &pop);
            assert!((0.0..=1.0).contains(&s), "score {s} out of range");
        }
    }

    #[test]
    fn test_full_overlap_scores_high() {
        let scorer = LexicalScorer::default();
        let (cands, pop) = population(&["configure hooks", "server rendering", "deploy guide"]);
        let query = tokenize("configure hooks");
        let s = scorer.score(&query, &cands[0], &pop);
        assert!(s > 0.9, "full-overlap score too low: {s}");
    }

    #[test]
    fn test_partial_overlap_scores_between() {
        let scorer = LexicalScorer::default();
        let (cands, pop) = population(&["hooks reference", "server rendering", "deploy guide"]);
        let query = tokenize("hooks configuration");
        let s = scorer.score(&query, &cands[0], &pop);
        assert!(s > 0.0 && s < 1.0, "partial score {s} not strictly inside");
    }

    #[test]
    fn test_rare_term_outweighs_common() {
        let scorer = LexicalScorer::default();
        // "guide" appears everywhere; "webhooks" only once.
        let (cands, pop) = population(&[
            "webhooks guide",
            "deployment guide",
            "rendering guide",
            "testing guide",
        ]);
        let query = tokenize("webhooks deployment");
        let rare_hit = scorer.score(&query, &cands[0], &pop);
        let common_hit = scorer.score(&tokenize("guide deployment"), &cands[2], &pop);
        assert!(
            rare_hit > common_hit,
            "rare-term match {rare_hit} should beat common-term match {common_hit}"
        );
    }

    #[test]
    fn test_empty_inputs_score_zero() {
        let scorer = LexicalScorer::default();
        let (cands, pop) = population(&["configure hooks"]);
        assert_eq!(scorer.score(&[], &cands[0], &pop), 0.0);
        assert_eq!(scorer.score(&tokenize("hooks"), &[], &pop), 0.0);
    }

    #[test]
    fn test_duplicate_query_terms_collapse() {
        let scorer = LexicalScorer::default();
        let (cands, pop) = population(&["configure hooks", "server rendering"]);
        let once = scorer.score(&tokenize("hooks"), &cands[0], &pop);
        let thrice = scorer.score(&tokenize("hooks hooks hooks"), &cands[0], &pop);
        assert!((once - thrice).abs() < 1e-12);
    }

    #[test]
    fn test_absent_terms_do_not_drown_partial_match() {
        let scorer = LexicalScorer::default();
        let (cands, pop) = population(&["hooks reference", "server rendering", "deploy guide"]);
        // "configuration" appears nowhere; with raw OOV IDF in the
        // normalizer this match would score ~0.2, far under any threshold.
        let s = scorer.score(&tokenize("hooks configuration"), &cands[0], &pop);
        assert!((s - 0.5).abs() < 1e-9, "expected 0.5, got {s}");
    }

    #[test]
    fn test_idf_orders_by_rarity() {
        let (_, pop) = population(&["alpha beta", "alpha gamma", "alpha delta"]);
        assert!(pop.idf("beta") > pop.idf("alpha"));
        assert!(pop.idf("missing") > pop.idf("beta"));
    }

    #[test]
    fn test_deterministic() {
        let scorer = LexicalScorer::default();
        let (cands, pop) = population(&["configure hooks", "hooks reference"]);
        let query = tokenize("hooks configuration");
        let a = scorer.score(&query, &cands[0], &pop);
        let b = scorer.score(&query, &cands[0], &pop);
        assert_eq!(a, b);
    }
}
