//! Bootstrap and feature-subset sampling.

use rand::Rng;
use rand::seq::SliceRandom;

/// Draw `k` indices uniformly from `0..n`, duplicates allowed.
pub(crate) fn sample_with_replacement(n: usize, k: usize, rng: &mut impl Rng) -> Vec<usize> {
    (0..k).map(|_| rng.gen_range(0..n)).collect()
}

/// Draw `k` distinct indices from `0..n`.
///
/// Shuffles the full range and keeps the first `k`, so every subset of size
/// `k` is equally likely. `k` is clamped to `n`.
pub(crate) fn sample_without_replacement(n: usize, k: usize, rng: &mut impl Rng) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices.truncate(k.min(n));
    indices
}
