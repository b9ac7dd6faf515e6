// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Result merging and the hierarchical heading filter.
//!
//! [`merge_hits`] combines the outputs of independently-run fallback
//! strategies. It must be commutative and associative: the parallel mode
//! joins both strategies and the merged output has to be identical
//! whichever finishes first. That is why everything here is keyed and
//! ordered - groups by `(doc_set, page_title)` in BTreeMap order, headings
//! by line - and why heading conflicts resolve through a total order
//! (score, then precision, then earliest line) instead of "whoever came
//! second".
//!
//! [`hierarchical_filter`] is the last pass over every result: once a
//! heading at level L is retained, deeper headings nested under it are
//! redundant - the extraction collaborator will pull the whole section
//! anyway. The shallowest heading of a relevant cluster always survives.

use std::collections::BTreeMap;

use crate::types::{DocSetId, PageHit, ScoredHeading};

// =============================================================================
// MERGE
// =============================================================================

/// Merge two result sets produced by independent strategies.
///
/// Entries are grouped by `(doc_set, page_title)`; within a group the
/// heading lists are unioned by heading text, keeping the entry with the
/// higher lexical score, and the bookkeeping counts are summed.
pub fn merge_hits(a: Vec<PageHit>, b: Vec<PageHit>) -> Vec<PageHit> {
    let mut groups: BTreeMap<(DocSetId, String), PageHit> = BTreeMap::new();
    for hit in a.into_iter().chain(b) {
        absorb(&mut groups, hit);
    }

    groups
        .into_values()
        .map(|mut hit| {
            hit.headings.sort_by_key(|h| h.line);
            hit
        })
        .collect()
}

/// Fold one hit into the group map.
fn absorb(groups: &mut BTreeMap<(DocSetId, String), PageHit>, hit: PageHit) {
    let key = (hit.doc_set.clone(), hit.page_title.clone());
    match groups.get_mut(&key) {
        None => {
            groups.insert(key, hit);
        }
        Some(existing) => {
            existing.heading_count += hit.heading_count;
            existing.precision_count += hit.precision_count;
            for heading in hit.headings {
                match existing
                    .headings
                    .iter_mut()
                    .find(|h| h.text == heading.text)
                {
                    None => existing.headings.push(heading),
                    Some(current) => {
                        if prefer(&heading, current) {
                            *current = heading;
                        }
                    }
                }
            }
        }
    }
}

/// Total order for conflicting entries of the same heading text.
///
/// Higher lexical score wins; ties break toward the precision-flagged
/// entry, then toward the earliest line. Symmetric in its arguments, which
/// is what keeps the merge commutative.
fn prefer(candidate: &ScoredHeading, current: &ScoredHeading) -> bool {
    if candidate.lexical_score != current.lexical_score {
        return candidate.lexical_score > current.lexical_score;
    }
    if candidate.precision != current.precision {
        return candidate.precision;
    }
    candidate.line < current.line
}

// =============================================================================
// HIERARCHICAL FILTER
// =============================================================================

/// Collapse redundant nested headings, keeping the shallowest of each
/// relevant cluster.
///
/// Walks headings in document order. After retaining a heading at level L,
/// every subsequent heading deeper than L is dropped until the next
/// heading at level <= L, which is retained and becomes the new reference
/// level. Idempotent: a filtered list passes through unchanged.
pub fn hierarchical_filter(mut headings: Vec<ScoredHeading>) -> Vec<ScoredHeading> {
    headings.sort_by_key(|h| h.line);

    let mut retained: Vec<ScoredHeading> = Vec::with_capacity(headings.len());
    let mut parent_level: Option<u8> = None;
    for heading in headings {
        match parent_level {
            Some(level) if heading.level > level => continue,
            _ => {
                parent_level = Some(heading.level);
                retained.push(heading);
            }
        }
    }
    retained
}

/// Apply the hierarchical filter to every page of a result set, refreshing
/// the bookkeeping counts to match what survived.
pub fn filter_hits(hits: Vec<PageHit>) -> Vec<PageHit> {
    hits.into_iter()
        .filter_map(|mut hit| {
            hit.headings = hierarchical_filter(hit.headings);
            if hit.headings.is_empty() {
                return None;
            }
            hit.heading_count = hit.headings.len();
            hit.precision_count = hit.headings.iter().filter(|h| h.precision).count();
            Some(hit)
        })
        .collect()
}
