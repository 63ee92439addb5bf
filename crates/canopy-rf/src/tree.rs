use crate::{
    RfError,
    histogram::LabelHistogram,
    matrix::SampleMatrix,
    node::{FeatureIndex, Node},
    split::{min_entropy_split, partition},
};

/// Minimum information gain (in bits) a split must exceed.
const MIN_INFO_GAIN: f64 = 1e-6;

/// Stopping rules and shared inputs for growing one tree.
///
/// `features` is the tree's fixed feature subset: every split at every depth
/// chooses among these columns only.
pub(crate) struct TreeBuilder<'a> {
    pub(crate) matrix: &'a SampleMatrix,
    pub(crate) labels: &'a [usize],
    pub(crate) features: &'a [usize],
    pub(crate) n_classes: usize,
    pub(crate) max_depth: usize,
    pub(crate) min_samples: usize,
}

impl TreeBuilder<'_> {
    /// Grow a tree over the bootstrap `samples`, reordering them in place.
    pub(crate) fn grow(&self, samples: &mut [usize]) -> DecisionTree {
        let root = self.build(0, samples);
        let mut features: Vec<FeatureIndex> =
            self.features.iter().map(|&f| FeatureIndex::new(f)).collect();
        features.sort_unstable();
        DecisionTree {
            root,
            features,
            n_features: self.matrix.n_features(),
        }
    }

    /// Recursively build the subtree for `samples` at `depth`.
    ///
    /// # Panics
    ///
    /// Panics if `samples` is empty. Splits only happen at a boundary
    /// between two present values, so both halves are always nonempty.
    fn build(&self, depth: usize, samples: &mut [usize]) -> Node {
        assert!(
            !samples.is_empty(),
            "tree builder reached an empty sample subset at depth {depth}"
        );

        let hist = LabelHistogram::from_samples(self.labels, samples, self.n_classes);
        if hist.n_nonzero() == 1 || depth >= self.max_depth || samples.len() <= self.min_samples
        {
            return leaf(&hist);
        }

        let parent_entropy = hist.entropy();
        let mut best_gain = MIN_INFO_GAIN;
        let mut best: Option<(usize, f64)> = None;
        for &feature in self.features {
            let candidate =
                min_entropy_split(self.matrix.column(feature), self.labels, samples, self.n_classes);
            let gain = parent_entropy - candidate.entropy;
            if gain > best_gain {
                best_gain = gain;
                best = Some((feature, candidate.threshold));
            }
        }

        let Some((feature, threshold)) = best else {
            return leaf(&hist);
        };

        let (left, right) = partition(samples, self.matrix.column(feature), threshold);
        Node::Split {
            feature: FeatureIndex::new(feature),
            threshold,
            left: Box::new(self.build(depth + 1, left)),
            right: Box::new(self.build(depth + 1, right)),
        }
    }
}

fn leaf(hist: &LabelHistogram) -> Node {
    let (label, confidence) = hist.majority();
    Node::Leaf { label, confidence }
}

/// A fitted entropy-split decision tree.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DecisionTree {
    pub(crate) root: Node,
    pub(crate) features: Vec<FeatureIndex>,
    pub(crate) n_features: usize,
}

impl DecisionTree {
    /// Route a sample to its leaf and return the leaf's `(label, confidence)`.
    ///
    /// Goes left when `sample[feature] < threshold`, right otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::DimensionMismatch`] when `sample.len() != n_features`.
    pub fn classify(&self, sample: &[f64]) -> Result<(usize, f64), RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::DimensionMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        Ok(self.root.descend(sample))
    }

    /// Borrow the root node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Return the feature subset this tree was allowed to split on, ascending.
    #[must_use]
    pub fn feature_subset(&self) -> &[FeatureIndex] {
        &self.features
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.root.count()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.root.count_leaves()
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-node tree (just a root leaf) has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grow(
        rows: &[Vec<f64>],
        labels: &[usize],
        features: &[usize],
        max_depth: usize,
        min_samples: usize,
    ) -> DecisionTree {
        let matrix = SampleMatrix::from_rows(rows, rows[0].len());
        let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;
        let builder = TreeBuilder {
            matrix: &matrix,
            labels,
            features,
            n_classes,
            max_depth,
            min_samples,
        };
        let mut samples: Vec<usize> = (0..rows.len()).collect();
        builder.grow(&mut samples)
    }

    fn split_features(node: &Node, out: &mut Vec<usize>) {
        if let Node::Split {
            feature,
            left,
            right,
            ..
        } = node
        {
            out.push(feature.index());
            split_features(left, out);
            split_features(right, out);
        }
    }

    #[test]
    fn pure_dataset_single_leaf() {
        let features = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let labels = vec![2, 2, 2];
        let tree = grow(&features, &labels, &[0, 1], 12, 1);
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(
            tree.root(),
            &Node::Leaf {
                label: 2,
                confidence: 1.0
            }
        );
    }

    #[test]
    fn linearly_separable_correct_split() {
        let features = vec![
            vec![1.0, 0.0],
            vec![2.0, 0.0],
            vec![3.0, 0.0],
            vec![10.0, 0.0],
            vec![11.0, 0.0],
            vec![12.0, 0.0],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let tree = grow(&features, &labels, &[0, 1], 12, 1);
        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.classify(&[2.0, 0.0]).unwrap(), (0, 1.0));
        assert_eq!(tree.classify(&[11.0, 0.0]).unwrap(), (1, 1.0));
        match tree.root() {
            Node::Split {
                feature, threshold, ..
            } => {
                assert_eq!(feature.index(), 0);
                assert!((threshold - 6.5).abs() < f64::EPSILON);
            }
            Node::Leaf { .. } => panic!("root should split"),
        }
    }

    #[test]
    fn xor_needs_depth_two() {
        let features = vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ];
        let labels = vec![0, 1, 1, 0];
        // No single axis-aligned split has positive gain on XOR, so the root
        // stays a leaf.
        let tree = grow(&features, &labels, &[0, 1], 12, 1);
        assert_eq!(tree.n_nodes(), 1);
        let (_, confidence) = tree.classify(&[0.0, 0.0]).unwrap();
        assert!((confidence - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn max_depth_limits_tree() {
        let features: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64]).collect();
        let labels = vec![0, 1, 0, 1, 0, 1, 0, 1];
        let tree = grow(&features, &labels, &[0], 1, 1);
        assert!(tree.depth() <= 1);
    }

    #[test]
    fn min_samples_stops_splitting() {
        let features = vec![vec![0.0], vec![0.0], vec![10.0], vec![10.0]];
        let labels = vec![0, 0, 1, 1];
        let tree = grow(&features, &labels, &[0], 12, 4);
        assert_eq!(tree.n_nodes(), 1);
        let tree = grow(&features, &labels, &[0], 12, 3);
        assert_eq!(tree.n_nodes(), 3);
    }

    #[test]
    fn leaf_confidence_is_majority_share() {
        // Constant feature: no split possible, leaf keeps the 3:1 majority.
        let features = vec![vec![1.0], vec![1.0], vec![1.0], vec![1.0]];
        let labels = vec![1, 1, 0, 1];
        let tree = grow(&features, &labels, &[0], 12, 1);
        assert_eq!(
            tree.root(),
            &Node::Leaf {
                label: 1,
                confidence: 0.75
            }
        );
    }

    #[test]
    fn splits_only_use_feature_subset() {
        // Feature 0 is perfectly informative but excluded from the subset.
        let features = vec![
            vec![0.0, 1.0, 5.0],
            vec![0.0, 2.0, 4.0],
            vec![1.0, 3.0, 3.0],
            vec![1.0, 4.0, 2.0],
            vec![1.0, 5.0, 1.0],
        ];
        let labels = vec![0, 0, 1, 1, 1];
        let tree = grow(&features, &labels, &[2, 1], 12, 1);
        let mut used = Vec::new();
        split_features(tree.root(), &mut used);
        assert!(!used.is_empty());
        assert!(used.iter().all(|&f| f == 1 || f == 2));
        assert_eq!(
            tree.feature_subset(),
            &[FeatureIndex::new(1), FeatureIndex::new(2)]
        );
    }

    #[test]
    fn duplicate_bootstrap_samples() {
        let rows = vec![vec![0.0], vec![10.0]];
        let labels = vec![0, 1];
        let matrix = SampleMatrix::from_rows(&rows, 1);
        let builder = TreeBuilder {
            matrix: &matrix,
            labels: &labels,
            features: &[0],
            n_classes: 2,
            max_depth: 12,
            min_samples: 1,
        };
        let mut samples = vec![0, 1, 0, 0, 1];
        let tree = builder.grow(&mut samples);
        assert_eq!(tree.classify(&[0.0]).unwrap(), (0, 1.0));
        assert_eq!(tree.classify(&[10.0]).unwrap(), (1, 1.0));
    }

    #[test]
    fn prediction_dimension_mismatch() {
        let features = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let labels = vec![0, 1];
        let tree = grow(&features, &labels, &[0, 1], 12, 1);
        let err = tree.classify(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            RfError::DimensionMismatch {
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    #[should_panic(expected = "empty sample subset")]
    fn empty_samples_panic() {
        let rows = vec![vec![0.0]];
        let matrix = SampleMatrix::from_rows(&rows, 1);
        let builder = TreeBuilder {
            matrix: &matrix,
            labels: &[0],
            features: &[0],
            n_classes: 1,
            max_depth: 12,
            min_samples: 1,
        };
        builder.grow(&mut []);
    }
}
