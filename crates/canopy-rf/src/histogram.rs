//! Weighted label histograms and base-2 Shannon entropy.
//!
//! Every sample carries weight 1.0. Histograms are dense over class ids
//! `0..n_classes`, so scanning order (and therefore tie-breaking) is by
//! ascending class id.

/// Weights below this are treated as zero when computing entropy.
const WEIGHT_EPSILON: f64 = 1e-6;

/// Per-class weight totals for a set of samples.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LabelHistogram {
    weights: Vec<f64>,
    total: f64,
}

impl LabelHistogram {
    /// An empty histogram over `n_classes` classes.
    pub(crate) fn empty(n_classes: usize) -> Self {
        Self {
            weights: vec![0.0; n_classes],
            total: 0.0,
        }
    }

    /// Histogram of `labels[s]` for every `s` in `samples`.
    pub(crate) fn from_samples(labels: &[usize], samples: &[usize], n_classes: usize) -> Self {
        let mut hist = Self::empty(n_classes);
        for &si in samples {
            hist.add(labels[si]);
        }
        hist
    }

    pub(crate) fn add(&mut self, label: usize) {
        self.weights[label] += 1.0;
        self.total += 1.0;
    }

    pub(crate) fn remove(&mut self, label: usize) {
        self.weights[label] -= 1.0;
        self.total -= 1.0;
    }

    pub(crate) fn total(&self) -> f64 {
        self.total
    }

    /// Number of classes with nonzero weight.
    pub(crate) fn n_nonzero(&self) -> usize {
        self.weights.iter().filter(|&&w| w > 0.0).count()
    }

    /// Class with the largest weight and its share of the total.
    ///
    /// Ties go to the lowest class id. Returns `(0, 0.0)` when empty.
    pub(crate) fn majority(&self) -> (usize, f64) {
        let mut best = (0usize, 0.0f64);
        for (label, &weight) in self.weights.iter().enumerate() {
            if weight > best.1 {
                best = (label, weight);
            }
        }
        if self.total > 0.0 {
            (best.0, best.1 / self.total)
        } else {
            (best.0, 0.0)
        }
    }

    /// Shannon entropy in bits: `-Σ p·log2(p)`.
    pub(crate) fn entropy(&self) -> f64 {
        if self.total <= 0.0 {
            return 0.0;
        }
        -self
            .weights
            .iter()
            .filter(|&&w| w >= WEIGHT_EPSILON)
            .map(|&w| {
                let p = w / self.total;
                p * p.log2()
            })
            .sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::LabelHistogram;

    #[test]
    fn pure_entropy_is_zero() {
        let hist = LabelHistogram::from_samples(&[1, 1, 1], &[0, 1, 2], 2);
        assert!(hist.entropy().abs() < f64::EPSILON);
        assert_eq!(hist.n_nonzero(), 1);
    }

    #[test]
    fn balanced_binary_entropy_is_one_bit() {
        let hist = LabelHistogram::from_samples(&[0, 1, 0, 1], &[0, 1, 2, 3], 2);
        assert!((hist.entropy() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn uniform_four_class_entropy_is_two_bits() {
        let hist = LabelHistogram::from_samples(&[0, 1, 2, 3], &[0, 1, 2, 3], 4);
        assert!((hist.entropy() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn duplicate_samples_count_twice() {
        let hist = LabelHistogram::from_samples(&[0, 1], &[0, 0, 0, 1], 2);
        assert!((hist.total() - 4.0).abs() < f64::EPSILON);
        let (label, confidence) = hist.majority();
        assert_eq!(label, 0);
        assert!((confidence - 0.75).abs() < 1e-12);
    }

    #[test]
    fn add_remove_round_trip() {
        let mut hist = LabelHistogram::empty(3);
        hist.add(2);
        hist.add(1);
        hist.remove(2);
        assert_eq!(hist.n_nonzero(), 1);
        assert_eq!(hist.majority(), (1, 1.0));
    }

    #[test]
    fn empty_histogram() {
        let hist = LabelHistogram::empty(2);
        assert_eq!(hist.n_nonzero(), 0);
        assert!(hist.entropy().abs() < f64::EPSILON);
        assert_eq!(hist.majority(), (0, 0.0));
    }
}
