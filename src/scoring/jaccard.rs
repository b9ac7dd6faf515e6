// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Jaccard set similarity: intersection over union.
//!
//! Deliberately coarse. Collection matching does not need term weighting -
//! it needs a cheap, symmetric answer to "do these two keyword sets talk
//! about the same thing?".

use std::collections::HashSet;

/// `|A ∩ B| / |A ∪ B|`, in `[0, 1]`.
///
/// `0.0` when either set is empty (an empty union carries no signal, and
/// dividing by zero is not a similarity).
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}
