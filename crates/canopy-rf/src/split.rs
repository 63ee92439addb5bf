use crate::histogram::LabelHistogram;

/// Adjacent sorted values closer than this are treated as equal.
const VALUE_EPSILON: f64 = 1e-9;

/// Weighted entropy reported when no boundary exists.
pub(crate) const NO_SPLIT_ENTROPY: f64 = f64::MAX;

/// Best threshold found for one feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SplitCandidate {
    /// Size-weighted entropy of the two sides, in bits.
    pub(crate) entropy: f64,
    /// Midpoint between the two values straddling the boundary.
    pub(crate) threshold: f64,
}

impl SplitCandidate {
    fn none() -> Self {
        Self {
            entropy: NO_SPLIT_ENTROPY,
            threshold: 0.0,
        }
    }
}

/// Find the entropy-minimizing threshold on one feature column.
///
/// Sorts `samples` in place by `values[s]`, then sweeps left to right,
/// moving one sample at a time from the right histogram to the left one.
/// At every boundary between distinct values it scores
/// `(|L|/n)·H(L) + (|R|/n)·H(R)` and keeps the minimum.
///
/// Returns [`NO_SPLIT_ENTROPY`] with threshold 0 when `samples` is empty or
/// every value is identical.
///
/// # Column-major layout
///
/// `values` is a single feature column: `values[sample_idx]`.
pub(crate) fn min_entropy_split(
    values: &[f64],
    labels: &[usize],
    samples: &mut [usize],
    n_classes: usize,
) -> SplitCandidate {
    let n_samples = samples.len();
    if n_samples == 0 {
        return SplitCandidate::none();
    }

    samples.sort_unstable_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut right = LabelHistogram::from_samples(labels, samples, n_classes);
    let mut left = LabelHistogram::empty(n_classes);
    let n_inverse = 1.0 / n_samples as f64;
    let mut best = SplitCandidate::none();

    for pair in samples.windows(2) {
        let (si, next) = (pair[0], pair[1]);
        let label = labels[si];
        right.remove(label);
        left.add(label);

        if (values[si] - values[next]).abs() < VALUE_EPSILON {
            continue;
        }

        let entropy = left.total() * n_inverse * left.entropy()
            + right.total() * n_inverse * right.entropy();
        if entropy < best.entropy {
            best = SplitCandidate {
                entropy,
                threshold: threshold_between(values[si], values[next]),
            };
        }
    }

    best
}

/// Threshold strictly above `lo` and at most `hi`, for `lo < hi`.
///
/// Halves are summed so the midpoint of two huge values stays finite. When
/// `lo` and `hi` are adjacent floats the midpoint rounds onto `lo`, and `hi`
/// is used instead so `lo` still goes left and `hi` right.
fn threshold_between(lo: f64, hi: f64) -> f64 {
    let mid = lo * 0.5 + hi * 0.5;
    if mid <= lo { hi } else { mid }
}

/// Partition `samples` so that indices with `values[s] < threshold` come
/// first. Returns the two halves; order within each half is unspecified.
pub(crate) fn partition<'a>(
    samples: &'a mut [usize],
    values: &[f64],
    threshold: f64,
) -> (&'a mut [usize], &'a mut [usize]) {
    let (mut begin, mut end) = (0, samples.len());
    while begin < end {
        if values[samples[begin]] < threshold {
            begin += 1;
        } else {
            samples.swap(begin, end - 1);
            end -= 1;
        }
    }
    samples.split_at_mut(begin)
}
