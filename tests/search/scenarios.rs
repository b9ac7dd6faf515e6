//! End-to-end pipeline scenarios: one per documented behavior of the
//! primary path, the fallback trigger, the hierarchical filter, and the
//! empty-corpus edge.

use tocsin::{
    Corpus, DocSet, DocSetId, Query, SearchConfig, SearchEngine, SearchPath, Strategy,
};

use crate::common::{docs_corpus, page};

#[test]
fn test_title_match_opens_heading_stage() {
    // A title clearing the basic threshold is what lets its headings be
    // scored at all: the page wins on the title variant, the heading on
    // the rewritten one.
    let corpus = docs_corpus();
    let engine = SearchEngine::new(&corpus, SearchConfig::new(0.5)).unwrap();
    let query = Query::from_variants(["hooks reference", "configure hooks"]);

    let response = engine.search(&query);
    assert!(response.success);
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].page_title, "Hooks reference");
}

#[test]
fn test_precision_heading_completes_primary_path() {
    let corpus = docs_corpus();
    let engine = SearchEngine::new(&corpus, SearchConfig::new(0.5)).unwrap();
    let query = Query::from_variants(["hooks reference", "configure hooks"]);

    let response = engine.search(&query);
    assert_eq!(response.stats.path, SearchPath::Primary);
    // Fallback never ran.
    assert!(response.stats.strategies_attempted.is_empty());

    let hit = &response.results[0];
    let configure = hit
        .headings
        .iter()
        .find(|h| h.text == "Configure hooks")
        .expect("precision heading present");
    assert!(configure.precision);
    assert!(configure.lexical_score >= 0.7);
    // Provenance is complete enough for downstream extraction.
    assert_eq!(hit.doc_set, DocSetId::new("docs", "latest"));
    assert_eq!(hit.toc_reference, "docs/toc.md");
}

#[test]
fn test_primary_miss_triggers_index_grep() {
    let corpus = docs_corpus();
    let engine = SearchEngine::new(&corpus, SearchConfig::new(0.5)).unwrap();
    // No title comes near this phrasing; the keyword grep recovers the
    // heading as a basic, non-precision match.
    let response = engine.search(&Query::new("deployment considerations for production"));

    assert!(response.success);
    assert_eq!(response.stats.path, SearchPath::Fallback);
    assert_eq!(
        response.stats.strategies_attempted,
        vec![Strategy::IndexGrep]
    );

    let hit = &response.results[0];
    assert_eq!(hit.page_title, "Operations guide");
    let heading = &hit.headings[0];
    assert_eq!(heading.text, "Production Considerations");
    assert!(heading.lexical_score >= 0.25);
    assert!(!heading.precision);
}

#[test]
fn test_hierarchical_filter_collapses_nested_headings() {
    // [L2 Setup, L3 Advanced, L3 Basic] all retained -> only L2 survives.
    let corpus = Corpus::from_doc_sets(vec![DocSet::from_pages(
        DocSetId::new("docs", "latest"),
        "docs/toc.md",
        vec![page(
            "Setup guide",
            &[
                (2, "Setup"),
                (3, "Setup advanced"),
                (3, "Setup basics"),
            ],
        )],
    )]);
    let engine = SearchEngine::new(&corpus, SearchConfig::new(0.5)).unwrap();
    let response = engine.search(&Query::from_variants(["setup guide", "setup"]));

    assert!(response.success);
    let hit = &response.results[0];
    assert_eq!(hit.headings.len(), 1);
    assert_eq!(hit.headings[0].text, "Setup");
    assert_eq!(hit.headings[0].level, 2);
}

#[test]
fn test_sibling_sections_survive_filter() {
    let corpus = Corpus::from_doc_sets(vec![DocSet::from_pages(
        DocSetId::new("docs", "latest"),
        "docs/toc.md",
        vec![page(
            "Setup guide",
            &[
                (2, "Setup"),
                (3, "Setup advanced"),
                (2, "Setup checklist"),
            ],
        )],
    )]);
    let engine = SearchEngine::new(&corpus, SearchConfig::new(0.5)).unwrap();
    let response = engine.search(&Query::from_variants(["setup guide", "setup"]));

    let texts: Vec<_> = response.results[0]
        .headings
        .iter()
        .map(|h| h.text.as_str())
        .collect();
    assert_eq!(texts, vec!["Setup", "Setup checklist"]);
}

#[test]
fn test_empty_corpus_returns_well_formed_failure() {
    let corpus = Corpus::default();
    let engine = SearchEngine::new(&corpus, SearchConfig::new(0.5)).unwrap();
    let response = engine.search(&Query::new("anything at all"));

    assert!(!response.success);
    assert!(response.results.is_empty());
    assert_eq!(response.stats.path, SearchPath::NoMatch);
    assert_eq!(response.stats.rerank_calls, 0);
}

#[test]
fn test_no_result_page_is_ever_empty() {
    let corpus = docs_corpus();
    let engine = SearchEngine::new(&corpus, SearchConfig::new(0.5)).unwrap();

    for query in [
        Query::from_variants(["hooks reference", "configure hooks"]),
        Query::new("deployment considerations for production"),
        Query::new("kubernetes ingress controllers"),
    ] {
        let response = engine.search(&query);
        for hit in &response.results {
            assert!(!hit.headings.is_empty(), "empty page hit in response");
        }
    }
}

#[test]
fn test_heading_appears_once_per_page() {
    let corpus = docs_corpus();
    let engine = SearchEngine::new(&corpus, SearchConfig::new(0.5)).unwrap();
    let response = engine.search(&Query::from_variants(["hooks reference", "configure hooks"]));

    for hit in &response.results {
        let mut texts: Vec<_> = hit.headings.iter().map(|h| &h.text).collect();
        texts.sort();
        texts.dedup();
        assert_eq!(texts.len(), hit.headings.len(), "duplicate heading text");
    }
}

#[test]
fn test_scores_stay_in_unit_interval() {
    let corpus = docs_corpus();
    let engine = SearchEngine::new(&corpus, SearchConfig::new(0.5)).unwrap();

    for query in [
        Query::from_variants(["hooks reference", "configure hooks"]),
        Query::new("deployment considerations for production"),
    ] {
        let response = engine.search(&query);
        for hit in &response.results {
            for h in &hit.headings {
                assert!((0.0..=1.0).contains(&h.lexical_score));
                if let Some(s) = h.semantic_score {
                    assert!((0.0..=1.0).contains(&s));
                }
            }
        }
    }
}
