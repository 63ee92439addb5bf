use std::fmt;

/// Zero-based feature column index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct FeatureIndex(usize);

impl FeatureIndex {
    /// Create a new feature index from a zero-based column position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based feature column index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FeatureIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node in a decision tree.
///
/// A split node owns both of its children, so a fully built split can never
/// be missing a branch.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Node {
    /// An interior split node.
    Split {
        /// Feature used for the split.
        feature: FeatureIndex,
        /// Samples with `value < threshold` go left, all others right.
        threshold: f64,
        /// Subtree for `value < threshold`.
        left: Box<Node>,
        /// Subtree for `value >= threshold`.
        right: Box<Node>,
    },
    /// A terminal leaf node.
    Leaf {
        /// Majority class among the training samples that reached this leaf.
        label: usize,
        /// Share of the leaf's training weight belonging to `label`.
        confidence: f64,
    },
}

impl Node {
    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Follow splits from this node down to the leaf that `sample` falls in.
    ///
    /// Returns the leaf's `(label, confidence)`. `sample` must be at least
    /// as long as the largest feature index in the subtree.
    pub(crate) fn descend(&self, sample: &[f64]) -> (usize, f64) {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { label, confidence } => return (*label, *confidence),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if sample[feature.index()] < *threshold {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    };
                }
            }
        }
    }

    /// Count all nodes in this subtree.
    pub(crate) fn count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => 1 + left.count() + right.count(),
        }
    }

    /// Count the leaves in this subtree.
    pub(crate) fn count_leaves(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => left.count_leaves() + right.count_leaves(),
        }
    }

    /// Depth of the deepest leaf below this node (a leaf has depth 0).
    pub(crate) fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}
