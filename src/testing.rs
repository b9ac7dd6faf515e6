// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.
//! It provides canonical fixtures (a small two-collection corpus) and a
//! deterministic [`StubEmbedder`] standing in for the injected semantic
//! capability, with an invocation counter so tests can verify the
//! one-pass rerank budget from the outside.

#![doc(hidden)]

use std::sync::atomic::{AtomicU32, Ordering};

use crate::corpus::{Corpus, DocSet};
use crate::error::{Result, SearchError};
use crate::rerank::Embedder;
use crate::types::{DocSetId, Heading, Lang};

/// Embedding dimensionality of the stub.
const DIMS: usize = 16;

/// Deterministic embedder double.
///
/// Each text becomes a bag-of-token-hashes vector, so cosine similarity
/// tracks token overlap: texts sharing words score high, disjoint texts
/// score near zero. No model, no I/O, no randomness.
#[derive(Debug, Default)]
pub struct StubEmbedder {
    calls: AtomicU32,
    fail: bool,
}

impl StubEmbedder {
    /// A working stub.
    pub fn new() -> Self {
        StubEmbedder::default()
    }

    /// A stub whose every call fails, for degradation tests.
    pub fn failing() -> Self {
        StubEmbedder {
            calls: AtomicU32::new(0),
            fail: true,
        }
    }

    /// How many times `embed` was invoked.
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Embedder for StubEmbedder {
    fn embed(&self, texts: &[String], _lang: Lang) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SearchError::Semantic("stub configured to fail".to_string()));
        }
        Ok(texts.iter().map(|t| embed_one(t)).collect())
    }
}

fn embed_one(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; DIMS];
    for token in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        let bucket = token
            .bytes()
            .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(b)))
            as usize
            % DIMS;
        v[bucket] += 1.0;
    }
    v
}

/// Build a heading tuple list the way `DocSet::from_pages` wants it.
pub fn page(title: &str, headings: &[(u8, &str)]) -> (String, Vec<Heading>) {
    (
        title.to_string(),
        headings
            .iter()
            .map(|(level, text)| Heading::new(*level, *text))
            .collect(),
    )
}

/// The canonical single-collection corpus used across tests.
pub fn docs_corpus() -> Corpus {
    Corpus::from_doc_sets(vec![DocSet::from_pages(
        DocSetId::new("docs", "latest"),
        "docs/toc.md",
        vec![
            page(
                "Hooks reference",
                &[
                    (2, "Configure hooks"),
                    (3, "Hook ordering"),
                    (2, "Disable hooks"),
                    (2, "Server rendering"),
                ],
            ),
            page(
                "Operations guide",
                &[
                    (2, "Production Considerations"),
                    (2, "Local development"),
                ],
            ),
        ],
    )])
}

/// A two-collection corpus for collection-matching and widening tests.
pub fn two_collection_corpus() -> Corpus {
    Corpus::from_doc_sets(vec![
        DocSet::from_pages(
            DocSetId::new("react", "19.2"),
            "react/toc.md",
            vec![page(
                "Hooks reference",
                &[(2, "Configure hooks"), (2, "Rules of hooks")],
            )],
        ),
        DocSet::from_pages(
            DocSetId::new("fastify", "5.0"),
            "fastify/toc.md",
            vec![page(
                "Plugins guide",
                &[(2, "Register plugins"), (2, "Plugin encapsulation")],
            )],
        ),
    ])
}
