//! Majority-vote classification for the Random Forest ensemble.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::RfError;
use crate::forest::RandomForest;
use crate::tree::DecisionTree;

/// Ensemble prediction for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Class with the most tree votes.
    pub label: usize,
    /// Fraction of trees that voted for `label`, in `[0, 1]`.
    pub confidence: f64,
}

impl RandomForest {
    /// Classify a single sample by unweighted majority vote.
    ///
    /// Every tree contributes one vote for the label of the leaf the sample
    /// lands in, regardless of that leaf's own confidence. Ties go to the
    /// lowest class id.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::DimensionMismatch`] when `sample.len() != n_features`;
    /// no tree is traversed in that case.
    pub fn classify(&self, sample: &[f64]) -> Result<Prediction, RfError> {
        let votes = self.votes(sample)?;
        let (label, count) = votes
            .iter()
            .enumerate()
            .fold((0usize, 0usize), |best, (label, &count)| {
                if count > best.1 { (label, count) } else { best }
            });
        Ok(Prediction {
            label,
            confidence: count as f64 / self.trees.len() as f64,
        })
    }

    /// Return the per-class vote tally for a single sample.
    ///
    /// The returned `Vec` has length `n_classes` and sums to `n_trees`.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::DimensionMismatch`] when `sample.len() != n_features`.
    pub fn votes(&self, sample: &[f64]) -> Result<Vec<usize>, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::DimensionMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut votes = vec![0usize; self.n_classes];
        for tree in &self.trees {
            let (label, _) = tree.root.descend(sample);
            votes[label] += 1;
        }
        Ok(votes)
    }

    /// Classify a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::DimensionMismatch`] if any sample has the wrong feature count.
    pub fn classify_batch(&self, features: &[Vec<f64>]) -> Result<Vec<Prediction>, RfError> {
        features
            .into_par_iter()
            .map(|sample| self.classify(sample))
            .collect()
    }

    /// Return the number of features this forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of classes (largest training label + 1).
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Borrow the trees in training order.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::Prediction;
    use crate::config::ForestConfig;
    use crate::error::RfError;
    use crate::forest::RandomForest;
    use crate::matrix::SampleMatrix;
    use crate::tree::TreeBuilder;

    fn two_cluster_forest() -> RandomForest {
        let features = vec![vec![0.0], vec![0.0], vec![10.0], vec![10.0]];
        let labels = vec![0, 0, 1, 1];
        ForestConfig::new(15)
            .unwrap()
            .with_max_features(1)
            .with_min_samples(2)
            .with_max_depth(1)
            .fit(&features, &labels)
            .unwrap()
    }

    #[test]
    fn obvious_split_recovered() {
        let forest = two_cluster_forest();
        let low = forest.classify(&[0.0]).unwrap();
        let high = forest.classify(&[10.0]).unwrap();
        assert_eq!(low.label, 0);
        assert_eq!(high.label, 1);
        assert!(low.confidence > 0.5);
        assert!(high.confidence > 0.5);
    }

    #[test]
    fn confidence_is_full_when_every_tree_splits() {
        // Grow every tree on the full sample set so each one recovers the split.
        let features = vec![vec![0.0], vec![0.0], vec![10.0], vec![10.0]];
        let labels = vec![0, 0, 1, 1];
        let matrix = SampleMatrix::from_rows(&features, 1);
        let builder = TreeBuilder {
            matrix: &matrix,
            labels: &labels,
            features: &[0],
            n_classes: 2,
            max_depth: 1,
            min_samples: 2,
        };
        let trees: Vec<_> = (0..5)
            .map(|_| builder.grow(&mut (0..features.len()).collect::<Vec<_>>()))
            .collect();
        assert!(trees.iter().all(|t| !t.root().is_leaf()));

        let forest = RandomForest {
            trees,
            n_features: 1,
            n_classes: 2,
        };
        assert_eq!(
            forest.classify(&[0.0]).unwrap(),
            Prediction {
                label: 0,
                confidence: 1.0
            }
        );
        assert_eq!(
            forest.classify(&[10.0]).unwrap(),
            Prediction {
                label: 1,
                confidence: 1.0
            }
        );
    }

    #[test]
    fn votes_sum_to_tree_count() {
        let forest = two_cluster_forest();
        let votes = forest.votes(&[3.0]).unwrap();
        assert_eq!(votes.len(), 2);
        assert_eq!(votes.iter().sum::<usize>(), forest.n_trees());
    }

    #[test]
    fn label_from_training_set_and_confidence_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let features: Vec<Vec<f64>> = (0..40)
            .map(|_| (0..3).map(|_| rng.r#gen::<f64>()).collect())
            .collect();
        let labels: Vec<usize> = (0..40).map(|i| [1, 3, 7][i % 3]).collect();
        let forest = ForestConfig::new(9)
            .unwrap()
            .with_max_features(2)
            .fit(&features, &labels)
            .unwrap();

        let known: HashSet<usize> = labels.iter().copied().collect();
        for _ in 0..50 {
            let query: Vec<f64> = (0..3).map(|_| rng.r#gen::<f64>() * 2.0 - 0.5).collect();
            let prediction = forest.classify(&query).unwrap();
            assert!(known.contains(&prediction.label));
            assert!((0.0..=1.0).contains(&prediction.confidence));
        }
    }

    #[test]
    fn tied_votes_return_a_maximal_label() {
        let features = vec![vec![0.0], vec![0.0], vec![10.0], vec![10.0]];
        let labels = vec![0, 0, 1, 1];
        let forest = ForestConfig::new(4).unwrap().fit(&features, &labels).unwrap();
        let query = [5.0];
        let votes = forest.votes(&query).unwrap();
        let prediction = forest.classify(&query).unwrap();
        let max_votes = *votes.iter().max().unwrap();
        assert_eq!(votes[prediction.label], max_votes);
        assert!(
            (prediction.confidence - max_votes as f64 / forest.n_trees() as f64).abs() < 1e-12
        );
    }

    #[test]
    fn dimension_mismatch() {
        let forest = two_cluster_forest();
        let err = forest.classify(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            RfError::DimensionMismatch {
                expected: 1,
                got: 2
            }
        ));
        assert!(forest.classify_batch(&[vec![0.0], vec![]]).is_err());
    }

    #[test]
    fn batch_matches_individual() {
        let forest = two_cluster_forest();
        let samples = vec![vec![0.0], vec![4.0], vec![6.0], vec![10.0]];
        let batch = forest.classify_batch(&samples).unwrap();
        for (sample, prediction) in samples.iter().zip(&batch) {
            assert_eq!(&forest.classify(sample).unwrap(), prediction);
        }
    }
}
