// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Semantic reranking: the one expensive step, applied exactly once.
//!
//! The embedding model itself is an injected capability behind the
//! [`Embedder`] trait - this module only preprocesses heading text,
//! L2-normalizes the returned vectors, and takes dot products. What it
//! does enforce, hard, is the call budget: **at most one reranking pass
//! per search call**, made explicit through [`RerankBudget`] rather than
//! left to control-flow luck. A second acquisition attempt is an error,
//! whatever future refactors do to the branching above it.
//!
//! Degradation policy: if the capability fails, semantic scores stay
//! unset and every heading survives. Lexical thresholds already gated
//! basic relevance; a dead embedder should not turn a good lexical result
//! into an empty one.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::text::cjk_ratio;
use crate::types::{Lang, PageHit, Query};

// =============================================================================
// INJECTED CAPABILITY
// =============================================================================

/// The injected embedding capability.
///
/// Implementations return one vector per input text. `lang` selects
/// between a CJK-tuned and a Latin-tuned model; implementations that only
/// carry one model may ignore it. Vectors need not be pre-normalized -
/// the adapter normalizes before taking dot products.
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts.
    fn embed(&self, texts: &[String], lang: Lang) -> Result<Vec<Vec<f32>>>;
}

// =============================================================================
// CALL BUDGET
// =============================================================================

/// Single-use budget for the reranking pass.
///
/// One per search call. [`acquire`](Self::acquire) flips the flag with an
/// atomic check-and-set; the second caller gets
/// [`SearchError::RerankBudgetExhausted`] instead of a silent duplicate
/// embedding round-trip.
#[derive(Debug, Default)]
pub struct RerankBudget {
    spent: AtomicBool,
}

/// Proof that the budget was acquired. Only [`rerank`] consumes one.
#[derive(Debug)]
pub struct RerankPermit {
    _private: (),
}

impl RerankBudget {
    /// A fresh, unspent budget.
    pub fn new() -> Self {
        RerankBudget::default()
    }

    /// Claim the single reranking pass.
    pub fn acquire(&self) -> Result<RerankPermit> {
        if self.spent.swap(true, Ordering::SeqCst) {
            return Err(SearchError::RerankBudgetExhausted);
        }
        Ok(RerankPermit { _private: () })
    }

    /// Whether the pass has been claimed.
    pub fn is_spent(&self) -> bool {
        self.spent.load(Ordering::SeqCst)
    }
}

// =============================================================================
// PREPROCESSING
// =============================================================================

/// Prepare one heading text for embedding.
///
/// If the heading contains a domain noun, it is load-bearing context and
/// the text passes through verbatim. Otherwise any predicate-verb tokens
/// are stripped - without the noun anchoring them, action words add noise
/// and no discriminating information.
pub fn preprocess_heading(text: &str, query: &Query) -> String {
    let lower = text.to_lowercase();
    let has_noun = query
        .domain_nouns
        .iter()
        .any(|noun| lower.contains(&noun.to_lowercase()));
    if has_noun || query.predicate_verbs.is_empty() {
        return text.to_string();
    }

    let verbs: Vec<String> = query
        .predicate_verbs
        .iter()
        .map(|v| v.to_lowercase())
        .collect();
    let kept: Vec<&str> = text
        .split_whitespace()
        .filter(|word| {
            let w = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            !verbs.contains(&w)
        })
        .collect();

    if kept.is_empty() {
        // Stripping everything would embed an empty string; the original
        // is the lesser evil.
        text.to_string()
    } else {
        kept.join(" ")
    }
}

/// Pick the similarity model by CJK character ratio across query variants.
pub fn detect_lang(query: &Query, config: &SearchConfig) -> Lang {
    let joined = query.variants.join(" ");
    if cjk_ratio(&joined) >= config.rerank_lang_threshold {
        Lang::Cjk
    } else {
        Lang::Latin
    }
}

// =============================================================================
// VECTOR MATH
// =============================================================================

/// L2-normalize in place. Zero vectors stay zero.
fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Dot product over the shared prefix of two vectors.
fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

// =============================================================================
// THE PASS
// =============================================================================

/// Run the reranking pass over a result set.
///
/// Consumes the call budget, embeds query variants and preprocessed
/// heading texts in a single capability invocation, scores each heading by
/// its best cosine against any variant (clamped to `[0, 1]`), drops
/// headings under `rerank_threshold`, and drops pages left empty.
///
/// On capability failure the input is returned unchanged except that the
/// budget is spent - a failed pass is still the pass.
pub fn rerank(
    hits: Vec<PageHit>,
    query: &Query,
    config: &SearchConfig,
    embedder: &dyn Embedder,
    budget: &RerankBudget,
) -> Result<Vec<PageHit>> {
    let _permit = budget.acquire()?;

    if hits.is_empty() || query.variants.is_empty() {
        return Ok(hits);
    }

    let lang = detect_lang(query, config);
    let heading_texts: Vec<String> = hits
        .iter()
        .flat_map(|hit| hit.headings.iter())
        .map(|h| preprocess_heading(&h.text, query))
        .collect();

    let mut texts = query.variants.clone();
    texts.extend(heading_texts);

    let mut vectors = match embedder.embed(&texts, lang) {
        Ok(vectors) if vectors.len() == texts.len() => vectors,
        Ok(vectors) => {
            warn!(
                expected = texts.len(),
                got = vectors.len(),
                "embedder returned wrong vector count, skipping semantic scores"
            );
            return Ok(hits);
        }
        Err(err) => {
            warn!(error = %err, "embedder failed, skipping semantic scores");
            return Ok(hits);
        }
    };

    for v in &mut vectors {
        l2_normalize(v);
    }
    let (query_vecs, heading_vecs) = vectors.split_at(query.variants.len());

    let mut cursor = 0usize;
    let mut reranked = Vec::with_capacity(hits.len());
    for mut hit in hits {
        let mut survivors = Vec::with_capacity(hit.headings.len());
        for mut heading in hit.headings {
            let similarity = query_vecs
                .iter()
                .map(|q| dot(q, &heading_vecs[cursor]))
                .fold(f32::MIN, f32::max)
                .clamp(0.0, 1.0) as f64;
            cursor += 1;

            heading.semantic_score = Some(similarity);
            if similarity >= config.rerank_threshold {
                survivors.push(heading);
            }
        }

        if survivors.is_empty() {
            debug!(page = %hit.page_title, "all headings dropped by rerank");
            continue;
        }
        hit.heading_count = survivors.len();
        hit.precision_count = survivors.iter().filter(|h| h.precision).count();
        hit.headings = survivors;
        reranked.push(hit);
    }
    Ok(reranked)
}
