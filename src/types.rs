// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The building blocks of a retrieval call.
//!
//! These types define how doc-sets, pages, and headings flow through the
//! pipeline and what comes out the other end. Everything here is cheap to
//! clone and carries no references into the corpus, so results outlive the
//! search call that produced them.
//!
//! # Invariants (the stuff that breaks if you ignore it)
//!
//! - **Scores**: `lexical_score` and `semantic_score` are normalized to
//!   `[0, 1]`. Anything outside that range is a scoring bug, not a data
//!   quirk.
//! - **PageHit**: a heading text appears at most once per hit, and
//!   `headings` is never empty in a final response - a page whose headings
//!   were all filtered out is dropped entirely.
//! - **Heading order**: `ScoredHeading.line` preserves document order.
//!   The hierarchical filter depends on it; do not re-sort headings by
//!   score inside a page.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// IDENTITY
// =============================================================================

/// Identity of a doc-set: a name plus a version tag.
///
/// Rendered as `name@version`, e.g. `react@19.2`. Parsed from directory
/// names by the corpus loader.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocSetId {
    /// Collection name, e.g. `react`.
    pub name: String,
    /// Version tag, e.g. `19.2` or `latest`.
    pub version: String,
}

impl DocSetId {
    /// Build an id from its parts.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        DocSetId {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Parse `name@version`. Returns `None` when either side is empty.
    pub fn parse(s: &str) -> Option<Self> {
        let (name, version) = s.split_once('@')?;
        if name.is_empty() || version.is_empty() {
            return None;
        }
        Some(DocSetId::new(name, version))
    }
}

impl fmt::Display for DocSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

// =============================================================================
// HEADINGS
// =============================================================================

/// One table-of-contents entry: a level and its text.
///
/// `level` is 1-6, mirroring markdown `#` depth. `text` is the heading with
/// markdown decoration already stripped (see `text::parse_heading_line`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Nesting depth, 1 (shallowest) through 6.
    pub level: u8,
    /// Cleaned heading text.
    pub text: String,
}

impl Heading {
    /// Construct a heading.
    pub fn new(level: u8, text: impl Into<String>) -> Self {
        Heading {
            level,
            text: text.into(),
        }
    }
}

/// A heading that survived matching, with its per-query scores attached.
///
/// `lexical_score` is always present (BM25). `semantic_score` is only
/// populated when the reranking pass ran for this heading; `None` means
/// "not scored", not "scored zero".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredHeading {
    /// Nesting depth, 1-6.
    pub level: u8,
    /// Cleaned heading text.
    pub text: String,
    /// Zero-based line number inside the TOC file. Preserves document
    /// order and lets the extraction collaborator seek straight to it.
    pub line: u32,
    /// BM25 relevance in `[0, 1]`.
    pub lexical_score: f64,
    /// Semantic relevance in `[0, 1]`, when reranking ran.
    pub semantic_score: Option<f64>,
    /// Whether `lexical_score` cleared the precision threshold.
    pub precision: bool,
}

// =============================================================================
// RESULTS
// =============================================================================

/// One page's worth of matched headings, with provenance.
///
/// Carries enough context (`doc_set`, `page_title`, `toc_reference`) for a
/// downstream extractor to fetch the body of any heading without this
/// engine re-reading page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageHit {
    /// Which doc-set the page belongs to.
    pub doc_set: DocSetId,
    /// The page title as it appears in the TOC file.
    pub page_title: String,
    /// Relative path of the TOC file the page was parsed from.
    pub toc_reference: String,
    /// Surviving headings in document order.
    pub headings: Vec<ScoredHeading>,
    /// Basic matches accumulated into this hit (bookkeeping; summed on merge).
    pub heading_count: usize,
    /// Precision matches accumulated into this hit (bookkeeping; summed on merge).
    pub precision_count: usize,
}

impl PageHit {
    /// Best lexical score among the surviving headings.
    ///
    /// Used to order pages in the final response. `0.0` for an empty hit,
    /// which should not survive to a response anyway.
    pub fn best_score(&self) -> f64 {
        self.headings
            .iter()
            .map(|h| h.lexical_score)
            .fold(0.0, f64::max)
    }

    /// Whether any surviving heading is a precision match.
    pub fn has_precision(&self) -> bool {
        self.headings.iter().any(|h| h.precision)
    }
}

// =============================================================================
// QUERY
// =============================================================================

/// A search request: one or more variants of the same user intent.
///
/// `domain_nouns` and `predicate_verbs` only bias the reranking
/// preprocessor; they never filter matches directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Query {
    /// Query variants. The engine keeps the best score across variants.
    pub variants: Vec<String>,
    /// Load-bearing domain terms; a heading containing one is reranked verbatim.
    #[serde(default)]
    pub domain_nouns: Vec<String>,
    /// Action words stripped from headings that lack domain context.
    #[serde(default)]
    pub predicate_verbs: Vec<String>,
}

impl Query {
    /// A single-variant query.
    pub fn new(text: impl Into<String>) -> Self {
        Query {
            variants: vec![text.into()],
            ..Query::default()
        }
    }

    /// A query with several rewritten variants.
    pub fn from_variants<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Query {
            variants: variants.into_iter().map(Into::into).collect(),
            ..Query::default()
        }
    }

    /// Builder: attach domain nouns.
    pub fn with_domain_nouns<I, S>(mut self, nouns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domain_nouns = nouns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: attach predicate verbs.
    pub fn with_predicate_verbs<I, S>(mut self, verbs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.predicate_verbs = verbs.into_iter().map(Into::into).collect();
        self
    }
}

// =============================================================================
// OUTCOME AND RESPONSE
// =============================================================================

/// Which fallback strategy produced a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Index grep: keyword scan over TOC lines, re-scored lexically.
    IndexGrep,
    /// Context grep: keyword scan with a preceding-context window and
    /// nearest-heading attribution.
    ContextGrep,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::IndexGrep => write!(f, "index-grep"),
            Strategy::ContextGrep => write!(f, "context-grep"),
        }
    }
}

/// Which path produced the final results.
///
/// Primary and fallback are mutually exclusive by construction: fallback
/// only runs when the primary success condition fails, and primary results
/// are discarded (not merged) when it does.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The matcher pipeline met its success condition.
    Primary(Vec<PageHit>),
    /// The fallback engine ran; `strategies` lists what was attempted
    /// (not just what produced hits).
    Fallback {
        /// Merged fallback hits.
        hits: Vec<PageHit>,
        /// Strategies that were executed, in attempt order.
        strategies: Vec<Strategy>,
    },
}

impl SearchOutcome {
    /// Borrow the hits regardless of path.
    pub fn hits(&self) -> &[PageHit] {
        match self {
            SearchOutcome::Primary(hits) => hits,
            SearchOutcome::Fallback { hits, .. } => hits,
        }
    }

    /// Keep the path tag, transform the hits.
    pub fn map_hits(self, f: impl FnOnce(Vec<PageHit>) -> Vec<PageHit>) -> SearchOutcome {
        match self {
            SearchOutcome::Primary(hits) => SearchOutcome::Primary(f(hits)),
            SearchOutcome::Fallback { hits, strategies } => SearchOutcome::Fallback {
                hits: f(hits),
                strategies,
            },
        }
    }
}

/// Path tag surfaced in [`SearchStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchPath {
    /// The matcher pipeline succeeded on its own.
    Primary,
    /// The fallback engine supplied the results.
    Fallback,
    /// Nothing produced results (empty corpus, or every path came up dry).
    NoMatch,
}

/// Bookkeeping for one search call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Wall time for the whole call, in microseconds.
    pub elapsed_micros: u64,
    /// Page titles scored by the title matcher.
    pub pages_scored: usize,
    /// Headings scored across all stages.
    pub headings_scored: usize,
    /// Reranking passes executed. Always 0 or 1.
    pub rerank_calls: u32,
    /// Which path produced the results.
    pub path: SearchPath,
    /// Fallback strategies attempted, in order. Empty on the primary path.
    pub strategies_attempted: Vec<Strategy>,
}

/// The outcome of a search call.
///
/// `success = false` with an empty result list is a well-formed answer,
/// not an error - see the error taxonomy notes in `error.rs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Whether any page survived the full pipeline.
    pub success: bool,
    /// Surviving pages, best first. Never contains an empty `PageHit`.
    pub results: Vec<PageHit>,
    /// Call bookkeeping.
    pub stats: SearchStats,
}

/// Language family selected for the semantic capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lang {
    /// Latin-tuned similarity model.
    Latin,
    /// CJK-tuned similarity model.
    Cjk,
}
