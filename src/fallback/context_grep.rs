// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Strategy B: context-window grep with nearest-heading attribution.
//!
//! Where strategy A only accepts matches on heading lines, this one scans
//! every line and walks back up to N lines of preceding context to find
//! the nearest heading to blame. It starts with a tight window (N=5) and,
//! if that yields nothing at all, retries once with a wide one (N=20).
//! The walk-back is a binary search over the pre-parsed heading index,
//! not a re-scan of the captured context.

use std::collections::HashSet;

use tracing::debug;

use crate::config::SearchConfig;
use crate::corpus::DocSet;
use crate::fallback::{line_matches, score_candidates, RawCandidate};
use crate::types::{PageHit, Query};

/// Tight context window tried first.
const NARROW_WINDOW: u32 = 5;
/// Wide window for the single retry.
const WIDE_WINDOW: u32 = 20;

/// Run strategy B. Returns surviving hits and how many candidates were
/// re-scored.
pub fn run(
    collections: &[&DocSet],
    keywords: &[String],
    query: &Query,
    config: &SearchConfig,
) -> (Vec<PageHit>, usize) {
    let keywords_lower: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    let candidates = scan(collections, &keywords_lower, NARROW_WINDOW);
    let candidates = if candidates.is_empty() {
        debug!(window = WIDE_WINDOW, "narrow window empty, widening");
        scan(collections, &keywords_lower, WIDE_WINDOW)
    } else {
        candidates
    };

    score_candidates(candidates, query, config)
}

/// One scan pass with a fixed window.
fn scan<'c>(
    collections: &[&'c DocSet],
    keywords_lower: &[String],
    window: u32,
) -> Vec<RawCandidate<'c>> {
    let mut seen: HashSet<(usize, usize, usize)> = HashSet::new();
    let mut candidates = Vec::new();

    for (set_idx, &doc_set) in collections.iter().enumerate() {
        for toc in doc_set.tocs() {
            for (line_no, line) in toc.raw.lines().enumerate() {
                let line_lower = line.to_lowercase();
                if !line_matches(&line_lower, keywords_lower) {
                    continue;
                }
                let Some(entry) = toc.index.nearest_heading_within(line_no as u32, window)
                else {
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
    candidates
}
