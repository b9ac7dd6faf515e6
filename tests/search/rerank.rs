//! Reranking through the engine: the one-pass budget, threshold drops,
//! and graceful degradation, all observed from outside via the stub
//! embedder's call counter.

use std::sync::Arc;

use tocsin::{
    Corpus, DocSet, DocSetId, Query, SearchConfig, SearchEngine, SearchPath,
};

use crate::common::{docs_corpus, page, StubEmbedder};

fn primary_query() -> Query {
    Query::from_variants(["hooks reference", "configure hooks"])
}

#[test]
fn test_rerank_runs_once_on_primary_path() {
    let corpus = docs_corpus();
    let stub = Arc::new(StubEmbedder::new());
    let engine = SearchEngine::new(&corpus, SearchConfig::new(0.5))
        .unwrap()
        .with_embedder(stub.clone());

    let response = engine.search(&primary_query());
    assert!(response.success);
    assert_eq!(response.stats.path, SearchPath::Primary);
    assert_eq!(response.stats.rerank_calls, 1);
    assert_eq!(stub.call_count(), 1);
}

#[test]
fn test_rerank_runs_once_on_fallback_path() {
    let corpus = docs_corpus();
    let stub = Arc::new(StubEmbedder::new());
    let engine = SearchEngine::new(&corpus, SearchConfig::new(0.5))
        .unwrap()
        .with_embedder(stub.clone());

    let response = engine.search(&Query::new("production considerations"));
    assert_eq!(response.stats.path, SearchPath::Fallback);
    // One pass, whichever path produced the headings - never both.
    assert_eq!(response.stats.rerank_calls, 1);
    assert_eq!(stub.call_count(), 1);
}

#[test]
fn test_rerank_never_runs_without_results() {
    let corpus = docs_corpus();
    let stub = Arc::new(StubEmbedder::new());
    let engine = SearchEngine::new(&corpus, SearchConfig::new(0.5))
        .unwrap()
        .with_embedder(stub.clone());

    let response = engine.search(&Query::new("kubernetes ingress controllers"));
    assert!(!response.success);
    assert_eq!(response.stats.rerank_calls, 0);
    assert_eq!(stub.call_count(), 0);
}

#[test]
fn test_rerank_drops_semantically_distant_headings() {
    // "Configuring hooked callbacks" matches lexically through stemming,
    // but its surface tokens share nothing with the query, so the stub
    // embedder puts it nowhere near the variants.
    let corpus = Corpus::from_doc_sets(vec![DocSet::from_pages(
        DocSetId::new("docs", "latest"),
        "docs/toc.md",
        vec![page(
            "Hooks reference",
            &[
                (2, "Configure hooks"),
                (2, "Configuring hooked callbacks"),
            ],
        )],
    )]);
    let stub = Arc::new(StubEmbedder::new());
    let engine = SearchEngine::new(&corpus, SearchConfig::new(0.6))
        .unwrap()
        .with_embedder(stub.clone());

    let response = engine.search(&primary_query());
    assert!(response.success);
    let texts: Vec<_> = response.results[0]
        .headings
        .iter()
        .map(|h| h.text.as_str())
        .collect();
    assert_eq!(texts, vec!["Configure hooks"]);
    let kept = &response.results[0].headings[0];
    assert!(kept.semantic_score.unwrap() >= 0.6);
}

#[test]
fn test_rerank_failure_degrades_to_lexical() {
    let corpus = docs_corpus();
    let stub = Arc::new(StubEmbedder::failing());
    let engine = SearchEngine::new(&corpus, SearchConfig::new(0.5))
        .unwrap()
        .with_embedder(stub.clone());

    let response = engine.search(&primary_query());
    // The lexical result survives; semantic scores stay unset.
    assert!(response.success);
    for hit in &response.results {
        assert!(hit.headings.iter().all(|h| h.semantic_score.is_none()));
    }
    // The failed pass still counted against the budget.
    assert_eq!(response.stats.rerank_calls, 1);
    assert_eq!(stub.call_count(), 1);
}
