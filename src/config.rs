// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Per-call search configuration.
//!
//! A [`SearchConfig`] is an immutable parameter bundle for a single search.
//! The defaults mirror what the matchers were tuned against; the one field
//! with no default is `rerank_threshold` - upstream configuration examples
//! disagree on its value, so the caller has to pick one explicitly.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// How the fallback engine executes its two strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    /// Run index-grep first; only run context-grep if it finds nothing.
    #[default]
    Serial,
    /// Run both strategies concurrently and merge whatever both produce.
    Parallel,
}

/// Immutable parameter bundle for one search call.
///
/// Construct with [`SearchConfig::new`] (which takes the required
/// `rerank_threshold`), customize with the builder methods, and run
/// [`SearchConfig::validate`] before handing it to the engine - the
/// engine validates on entry as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// BM25 term-saturation parameter.
    pub k1: f64,
    /// BM25 length-normalization parameter.
    pub b: f64,
    /// Minimum Jaccard similarity for collection inference.
    pub threshold_collection: f64,
    /// Minimum title score for a page to enter heading matching.
    pub threshold_title: f64,
    /// Minimum heading score for a basic match.
    pub threshold_heading: f64,
    /// Minimum heading score for a precision match.
    pub threshold_precision: f64,
    /// Minimum surviving pages for primary-path success.
    pub min_pages: usize,
    /// Minimum basic-match headings a page needs to stay in the result set.
    pub min_headings: usize,
    /// Semantic score below which a reranked heading is dropped.
    /// Required; no canonical default exists.
    pub rerank_threshold: f64,
    /// CJK character ratio above which the CJK-tuned model is selected.
    pub rerank_lang_threshold: f64,
    /// Fallback execution mode.
    #[serde(default)]
    pub fallback_mode: FallbackMode,
    /// Explicit target collection names (`name@version`). When non-empty,
    /// collection inference is bypassed entirely.
    #[serde(default)]
    pub collections: Vec<String>,
}

impl SearchConfig {
    /// A config with tuned defaults and the caller-chosen rerank threshold.
    pub fn new(rerank_threshold: f64) -> Self {
        SearchConfig {
            k1: 1.2,
            b: 0.75,
            threshold_collection: 0.6,
            threshold_title: 0.6,
            threshold_heading: 0.25,
            threshold_precision: 0.7,
            min_pages: 1,
            min_headings: 1,
            rerank_threshold,
            rerank_lang_threshold: 0.3,
            fallback_mode: FallbackMode::Serial,
            collections: Vec::new(),
        }
    }

    /// Builder: BM25 parameters.
    pub fn with_bm25(mut self, k1: f64, b: f64) -> Self {
        self.k1 = k1;
        self.b = b;
        self
    }

    /// Builder: title threshold.
    pub fn with_threshold_title(mut self, t: f64) -> Self {
        self.threshold_title = t;
        self
    }

    /// Builder: heading basic/precision thresholds.
    pub fn with_threshold_heading(mut self, basic: f64, precision: f64) -> Self {
        self.threshold_heading = basic;
        self.threshold_precision = precision;
        self
    }

    /// Builder: collection-inference threshold.
    pub fn with_threshold_collection(mut self, t: f64) -> Self {
        self.threshold_collection = t;
        self
    }

    /// Builder: survival minimums.
    pub fn with_minimums(mut self, min_pages: usize, min_headings: usize) -> Self {
        self.min_pages = min_pages;
        self.min_headings = min_headings;
        self
    }

    /// Builder: fallback execution mode.
    pub fn with_fallback_mode(mut self, mode: FallbackMode) -> Self {
        self.fallback_mode = mode;
        self
    }

    /// Builder: explicit target collections, bypassing inference.
    pub fn with_collections<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collections = names.into_iter().map(Into::into).collect();
        self
    }

    /// Check every field against its legal range.
    pub fn validate(&self) -> Result<()> {
        if self.k1 <= 0.0 || !self.k1.is_finite() {
            return Err(SearchError::InvalidConfig(format!(
                "k1 must be a positive finite number, got {}",
                self.k1
            )));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(SearchError::InvalidConfig(format!(
                "b must be in [0, 1], got {}",
                self.b
            )));
        }
        for (name, value) in [
            ("threshold_collection", self.threshold_collection),
            ("threshold_title", self.threshold_title),
            ("threshold_heading", self.threshold_heading),
            ("threshold_precision", self.threshold_precision),
            ("rerank_threshold", self.rerank_threshold),
            ("rerank_lang_threshold", self.rerank_lang_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SearchError::InvalidConfig(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        if self.threshold_precision < self.threshold_heading {
            return Err(SearchError::InvalidConfig(format!(
                "threshold_precision ({}) below threshold_heading ({})",
                self.threshold_precision, self.threshold_heading
            )));
        }
        if self.min_pages == 0 || self.min_headings == 0 {
            return Err(SearchError::InvalidConfig(
                "min_pages and min_headings must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
