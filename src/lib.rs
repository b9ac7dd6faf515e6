// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fallback-escalating heading retrieval over documentation sets.
//!
//! Given a query (possibly several rewritten variants) and a corpus of
//! doc-sets - named, versioned collections of pages, each page an ordered
//! table of contents - tocsin finds the smallest set of headings relevant
//! enough to answer the query, with per-heading scores and provenance.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐   ┌───────────┐   ┌─────────────┐
//! │ collection │──▶│   title   │──▶│   heading   │──▶ success? ──┐
//! │  matcher   │   │  matcher  │   │   matcher   │              │no
//! └────────────┘   └───────────┘   └─────────────┘              ▼
//!        (matching/, scored by scoring/bm25)            ┌───────────────┐
//!                                                       │   fallback/   │
//!                        ┌──────────────┐               │ index_grep +  │
//!                        │   rerank     │◀──────────────│ context_grep  │
//!                        │ (≤ 1 pass)   │    merge.rs   └───────────────┘
//!                        └──────┬───────┘
//!                               ▼
//!                      hierarchical filter ──▶ SearchResponse
//! ```
//!
//! The matcher pipeline is strictly sequential; the two fallback
//! strategies are the one designed point of concurrency (joined, never
//! raced). The semantic reranker is an injected capability behind the
//! [`Embedder`] trait, throttled to one pass per call by [`RerankBudget`].
//!
//! # Usage
//!
//! ```
//! use tocsin::{Corpus, DocSet, DocSetId, Heading, Query, SearchConfig, SearchEngine};
//!
//! let corpus = Corpus::from_doc_sets(vec![DocSet::from_pages(
//!     DocSetId::new("docs", "latest"),
//!     "docs/toc.md",
//!     vec![("Hooks reference".to_string(), vec![Heading::new(2, "Configure hooks")])],
//! )]);
//!
//! let engine = SearchEngine::new(&corpus, SearchConfig::new(0.5))?;
//! let response = engine.search(&Query::new("hooks configuration"));
//! assert!(response.success);
//! # Ok::<(), tocsin::SearchError>(())
//! ```

// Module declarations
pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod matching;
pub mod merge;
pub mod rerank;
pub mod scoring;
pub mod testing;
pub mod text;
pub mod types;

// Re-exports for the public API
pub use config::{FallbackMode, SearchConfig};
pub use corpus::{Corpus, DocSet, HeadingIndex, IndexEntry, Page, TocFile};
pub use engine::SearchEngine;
pub use error::{Result, SearchError};
pub use merge::{filter_hits, hierarchical_filter, merge_hits};
pub use rerank::{Embedder, RerankBudget, RerankPermit};
pub use scoring::{jaccard, LexicalScorer, Population};
pub use types::{
    DocSetId, Heading, Lang, PageHit, Query, ScoredHeading, SearchOutcome, SearchPath,
    SearchResponse, SearchStats, Strategy,
};
