// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for the retrieval engine.
//!
//! The important thing to understand: "no results" is never an error here.
//! An empty corpus, a query nothing matches, fallback strategies coming up
//! dry - those are all valid search outcomes reported through
//! [`SearchResponse`](crate::types::SearchResponse) with `success = false`.
//! The variants below cover the things that actually went wrong: I/O while
//! loading a corpus, malformed configuration, and misuse of the single-shot
//! rerank budget.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can fail inside the engine.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Reading a corpus directory or TOC file failed.
    #[error("corpus I/O error at {path}: {source}")]
    CorpusIo {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A doc-set directory name did not parse as `name@version`.
    #[error("invalid doc-set name {0:?}: expected \"name@version\"")]
    InvalidDocSetName(String),

    /// A configuration field failed validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The per-search rerank budget was already spent.
    ///
    /// The budget is exactly one reranking pass per search call. Hitting
    /// this means a second call site tried to rerank - a logic bug in the
    /// caller, not a data problem.
    #[error("rerank budget exhausted: at most one reranking pass per search call")]
    RerankBudgetExhausted,

    /// The injected semantic-similarity capability reported a failure.
    ///
    /// The engine degrades gracefully on this (semantic scores stay unset);
    /// the variant exists so embedder implementations have a typed way to
    /// say "I could not embed this batch".
    #[error("semantic scorer failed: {0}")]
    Semantic(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SearchError>;
