// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Strategy A: grep the TOC indexes, re-score the heading lines.
//!
//! Scans every TOC file in the target collections for lines mentioning any
//! query keyword (case-insensitive). A match only counts when the line
//! itself is a heading line; the enclosing page comes from the pre-parsed
//! heading index, so attribution is a binary search rather than a backward
//! re-scan of the text. Matched headings are re-scored with the stemmed
//! BM25 model against the full query.

use std::collections::HashSet;

use crate::config::SearchConfig;
use crate::corpus::DocSet;
use crate::fallback::{line_matches, score_candidates, RawCandidate};
use crate::types::{PageHit, Query};

/// Run strategy A. Returns surviving hits and how many candidates were
/// re-scored.
pub fn run(
    collections: &[&DocSet],
    keywords: &[String],
    query: &Query,
    config: &SearchConfig,
) -> (Vec<PageHit>, usize) {
    let keywords_lower: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    let mut seen: HashSet<(usize, usize, usize)> = HashSet::new();
    let mut candidates = Vec::new();

    for (set_idx, &doc_set) in collections.iter().enumerate() {
        for toc in doc_set.tocs() {
            for (line_no, line) in toc.raw.lines().enumerate() {
                let line_lower = line.to_lowercase();
                if !line_matches(&line_lower, &keywords_lower) {
                    continue;
                }
                // The matched line must itself be a heading; a page-title
                // marker identifies a page but carries no heading to score.
                let Some(entry) = toc.index.at(line_no as u32) else {
                    continue;
                };
                let Some(heading_idx) = entry.heading else {
                    continue;
                };
                if seen.insert((set_idx, entry.page, heading_idx)) {
                    candidates.push(RawCandidate {
                        doc_set,
                        page_idx: entry.page,
                        heading_idx,
                    });
                }
            }
        }
    }

    score_candidates(candidates, query, config)
}
