//! Model persistence via bincode.

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::error::RfError;
use crate::forest::RandomForest;
use crate::node::Node;

/// Current binary format version.
const FORMAT_VERSION: u32 = 1;

/// Versioned envelope written ahead of the forest.
#[derive(serde::Serialize, serde::Deserialize)]
struct ModelEnvelope<F> {
    format_version: u32,
    n_trees: usize,
    n_features: usize,
    n_classes: usize,
    forest: F,
}

impl RandomForest {
    /// Save the model to a binary file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::SerializeModel`] | bincode encoding failed |
    /// | [`RfError::WriteModel`] | file write failed |
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RfError> {
        let path = path.as_ref();

        let envelope = ModelEnvelope {
            format_version: FORMAT_VERSION,
            n_trees: self.trees.len(),
            n_features: self.n_features,
            n_classes: self.n_classes,
            forest: self,
        };

        let bytes = bincode::serialize(&envelope)
            .map_err(|source| RfError::SerializeModel { source })?;

        std::fs::write(path, &bytes).map_err(|source| RfError::WriteModel {
            path: path.to_path_buf(),
            source,
        })?;

        info!(size_bytes = bytes.len(), n_trees = self.trees.len(), "model saved");
        Ok(())
    }

    /// Load a model from a binary file written by [`RandomForest::save`].
    ///
    /// The decoded forest is checked against its header, and every node is
    /// checked against the recorded feature and class counts, so a loaded
    /// model never indexes out of range when classifying.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::ReadModel`] | file read failed |
    /// | [`RfError::DeserializeModel`] | bincode decoding failed |
    /// | [`RfError::IncompatibleModelVersion`] | format version mismatch |
    /// | [`RfError::InconsistentModel`] | header and forest disagree, or a node is out of range |
    #[instrument(fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RfError> {
        let path = path.as_ref();

        let bytes = std::fs::read(path).map_err(|source| RfError::ReadModel {
            path: path.to_path_buf(),
            source,
        })?;
        let envelope: ModelEnvelope<RandomForest> =
            bincode::deserialize(&bytes).map_err(|source| RfError::DeserializeModel {
                path: path.to_path_buf(),
                source,
            })?;

        let forest = envelope.into_checked(path)?;
        debug!(
            n_trees = forest.n_trees(),
            n_features = forest.n_features,
            n_classes = forest.n_classes,
            "model loaded"
        );
        Ok(forest)
    }
}

impl ModelEnvelope<RandomForest> {
    fn into_checked(self, path: &Path) -> Result<RandomForest, RfError> {
        if self.format_version != FORMAT_VERSION {
            return Err(RfError::IncompatibleModelVersion {
                expected: FORMAT_VERSION,
                found: self.format_version,
                path: path.to_path_buf(),
            });
        }

        let inconsistent = |reason: String| RfError::InconsistentModel {
            path: path.to_path_buf(),
            reason,
        };
        let forest = self.forest;
        if forest.trees.is_empty() {
            return Err(inconsistent("forest has no trees".into()));
        }
        let recorded = (self.n_trees, self.n_features, self.n_classes);
        let decoded = (forest.trees.len(), forest.n_features, forest.n_classes);
        if recorded != decoded {
            return Err(inconsistent(format!(
                "header (trees, features, classes) = {recorded:?}, forest has {decoded:?}"
            )));
        }
        for (tree_id, tree) in forest.trees.iter().enumerate() {
            if tree.n_features != forest.n_features {
                return Err(inconsistent(format!(
                    "tree {tree_id} expects {} features, forest has {}",
                    tree.n_features, forest.n_features
                )));
            }
            check_node(&tree.root, forest.n_features, forest.n_classes)
                .map_err(|reason| inconsistent(format!("tree {tree_id}: {reason}")))?;
        }
        Ok(forest)
    }
}

fn check_node(node: &Node, n_features: usize, n_classes: usize) -> Result<(), String> {
    match node {
        Node::Leaf { label, .. } if *label >= n_classes => {
            Err(format!("leaf label {label} is not below {n_classes} classes"))
        }
        Node::Leaf { .. } => Ok(()),
        Node::Split {
            feature,
            left,
            right,
            ..
        } => {
            if feature.index() >= n_features {
                return Err(format!("split on feature {feature} of {n_features}"));
            }
            check_node(left, n_features, n_classes)?;
            check_node(right, n_features, n_classes)
        }
    }
}
