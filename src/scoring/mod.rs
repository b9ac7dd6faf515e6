// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Scoring: how candidates get their numbers.
//!
//! Two signals live here. [`bm25`] is the lexical workhorse - every title
//! and heading comparison in the pipeline goes through it. [`jaccard`] is
//! the coarse set-similarity used only for picking a collection. Both are
//! pure functions of their inputs: no caches, no globals, safe to call
//! concurrently.

pub mod bm25;
pub mod jaccard;

pub use bm25::{LexicalScorer, Population};
pub use jaccard::jaccard;
