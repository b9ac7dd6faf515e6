//! Fallback engine behavior: serial escalation, parallel merge, and the
//! caller-side cross-collection retry.

use tocsin::{
    Corpus, DocSet, DocSetId, FallbackMode, Query, SearchConfig, SearchEngine, SearchPath,
    Strategy,
};

use crate::common::{docs_corpus, two_collection_corpus};

/// A corpus whose only keyword evidence lives in prose lines, so strategy
/// A (heading lines only) misses and strategy B must attribute through
/// its context window. The heading itself still re-scores against the
/// query because "apply"/"applies"/"applying" share the stem "appli" -
/// which, conveniently, is not a substring of the heading line.
fn prose_corpus() -> Corpus {
    let mut set = DocSet::new(DocSetId::new("docs", "latest"));
    set.add_toc(
        "docs/toc.md",
        "\
# Operations guide
## Apply settings
this applies to every environment override
## Local development
use the dev server
",
    );
    Corpus::from_doc_sets(vec![set])
}

#[test]
fn test_serial_fallback_stops_after_index_grep() {
    let corpus = docs_corpus();
    let engine = SearchEngine::new(&corpus, SearchConfig::new(0.5)).unwrap();
    let response = engine.search(&Query::new("production considerations"));

    assert!(response.success);
    assert_eq!(
        response.stats.strategies_attempted,
        vec![Strategy::IndexGrep]
    );
}

#[test]
fn test_serial_fallback_escalates_to_context_grep() {
    let corpus = prose_corpus();
    let engine = SearchEngine::new(&corpus, SearchConfig::new(0.5)).unwrap();
    // The stemmed keywords only surface in prose; A finds nothing on
    // heading lines, B walks back to "Apply settings".
    let response = engine.search(&Query::new("applying overrides"));

    assert!(response.success);
    assert_eq!(
        response.stats.strategies_attempted,
        vec![Strategy::IndexGrep, Strategy::ContextGrep]
    );
    assert_eq!(response.results[0].headings[0].text, "Apply settings");
}

#[test]
fn test_parallel_fallback_attempts_both_strategies() {
    let corpus = docs_corpus();
    let config = SearchConfig::new(0.5).with_fallback_mode(FallbackMode::Parallel);
    let engine = SearchEngine::new(&corpus, config).unwrap();
    let response = engine.search(&Query::new("production considerations"));

    assert!(response.success);
    assert_eq!(
        response.stats.strategies_attempted,
        vec![Strategy::IndexGrep, Strategy::ContextGrep]
    );
}

#[test]
fn test_parallel_merge_has_no_duplicate_headings() {
    // Both strategies find the same heading line; the merged entry must
    // carry it exactly once.
    let corpus = docs_corpus();
    let config = SearchConfig::new(0.5).with_fallback_mode(FallbackMode::Parallel);
    let engine = SearchEngine::new(&corpus, config).unwrap();
    let response = engine.search(&Query::new("production considerations"));

    for hit in &response.results {
        let mut texts: Vec<_> = hit.headings.iter().map(|h| &h.text).collect();
        texts.sort();
        texts.dedup();
        assert_eq!(texts.len(), hit.headings.len());
    }
}

#[test]
fn test_parallel_and_serial_agree_on_hits() {
    // Same corpus, same query: whichever mode ran, the surviving heading
    // set is the same (parallel may differ only in bookkeeping sums).
    let corpus = docs_corpus();
    let query = Query::new("production considerations");

    let serial = SearchEngine::new(&corpus, SearchConfig::new(0.5))
        .unwrap()
        .search(&query);
    let parallel = SearchEngine::new(
        &corpus,
        SearchConfig::new(0.5).with_fallback_mode(FallbackMode::Parallel),
    )
    .unwrap()
    .search(&query);

    let texts = |r: &tocsin::SearchResponse| -> Vec<(String, Vec<String>)> {
        r.results
            .iter()
            .map(|hit| {
                (
                    hit.page_title.clone(),
                    hit.headings.iter().map(|h| h.text.clone()).collect(),
                )
            })
            .collect()
    };
    assert_eq!(texts(&serial), texts(&parallel));
}

#[test]
fn test_both_strategies_dry_reports_attempts() {
    let corpus = docs_corpus();
    let engine = SearchEngine::new(&corpus, SearchConfig::new(0.5)).unwrap();
    let response = engine.search(&Query::new("kubernetes ingress controllers"));

    assert!(!response.success);
    assert!(response.results.is_empty());
    assert_eq!(
        response.stats.strategies_attempted,
        vec![Strategy::IndexGrep, Strategy::ContextGrep]
    );
}

#[test]
fn test_cross_collection_widening_is_a_caller_retry() {
    // The inferred collection (first in corpus order) has nothing; the
    // engine reports a dry run. Widening to every collection is the
    // caller's retry with explicit targets, not a third fallback tier.
    let corpus = two_collection_corpus();
    let query = Query::new("register plugins encapsulation");

    let first_try = SearchEngine::new(&corpus, SearchConfig::new(0.5))
        .unwrap()
        .search(&query);
    assert!(!first_try.success);
    assert!(!first_try.stats.strategies_attempted.is_empty());

    let widened_config = SearchConfig::new(0.5).with_collections(
        corpus
            .doc_sets()
            .iter()
            .map(|d| d.id().to_string())
            .collect::<Vec<_>>(),
    );
    let second_try = SearchEngine::new(&corpus, widened_config)
        .unwrap()
        .search(&query);

    assert!(second_try.success);
    assert_eq!(second_try.stats.path, SearchPath::Fallback);
    assert_eq!(second_try.results[0].page_title, "Plugins guide");
}
