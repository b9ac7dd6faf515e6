// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Collection selection: which doc-set(s) should this query search?
//!
//! Cheap by design. A single-collection corpus skips matching entirely,
//! an explicit target list bypasses it, and the inferred path is one
//! Jaccard comparison per collection name. Failing to clear the threshold
//! is not an error - the first collection in corpus order is a deliberate
//! conservative default, and the cross-collection widening that follows a
//! dry fallback run is the caller's retry policy, not ours.

use std::collections::HashSet;

use tracing::debug;

use crate::config::SearchConfig;
use crate::corpus::{Corpus, DocSet};
use crate::scoring::jaccard;
use crate::text::keyword_set;
use crate::types::Query;

/// Pick the target collections for a search call.
///
/// - Empty corpus: empty result (the engine turns that into a no-match
///   response).
/// - Explicit `config.collections`: resolved against the corpus and
///   returned as-is; names that resolve to nothing are dropped.
/// - Single collection: returned unconditionally.
/// - Otherwise: the collection whose name keywords are most Jaccard-similar
///   to the query keywords, if the best similarity clears
///   `threshold_collection`; the first collection in corpus order if not.
pub fn select_collections<'c>(
    corpus: &'c Corpus,
    query: &Query,
    config: &SearchConfig,
) -> Vec<&'c DocSet> {
    if corpus.is_empty() {
        return Vec::new();
    }

    if !config.collections.is_empty() {
        let mut seen = HashSet::new();
        return config
            .collections
            .iter()
            .filter_map(|name| corpus.find(name))
            .filter(|d| seen.insert(d.id().clone()))
            .collect();
    }

    let doc_sets = corpus.doc_sets();
    if doc_sets.len() == 1 {
        return vec![&doc_sets[0]];
    }

    let query_keywords: HashSet<String> = query
        .variants
        .iter()
        .flat_map(|v| keyword_set(v))
        .collect();

    let mut best: Option<(&DocSet, f64)> = None;
    for doc_set in doc_sets {
        let name_keywords = keyword_set(&doc_set.id().to_string());
        let similarity = jaccard(&query_keywords, &name_keywords);
        match best {
            Some((_, best_score)) if similarity <= best_score => {}
            _ => best = Some((doc_set, similarity)),
        }
    }

    match best {
        Some((doc_set, score)) if score >= config.threshold_collection => {
            debug!(collection = %doc_set.id(), score, "collection inferred");
            vec![doc_set]
        }
        _ => {
            debug!(collection = %doc_sets[0].id(), "no collection cleared threshold, defaulting to first");
            vec![&doc_sets[0]]
        }
    }
}
