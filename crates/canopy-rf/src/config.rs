//! Hyperparameters for Random Forest training.

use crate::error::RfError;
use crate::forest::RandomForest;

/// Configuration for Random Forest training.
///
/// Construct via [`ForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter       | Default |
/// |-----------------|---------|
/// | `max_depth`     | 12      |
/// | `max_records`   | 10000   |
/// | `max_features`  | 60      |
/// | `min_samples`   | 3       |
/// | `parallel`      | 2       |
/// | `learning_rate` | 0.0     |
/// | `seed`          | 42      |
///
/// Every count must be at least 1. `n_trees` is checked here; the rest are
/// checked by [`ForestConfig::fit`] before any training work starts.
#[derive(Debug, Clone)]
pub struct ForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) max_depth: usize,
    pub(crate) max_records: usize,
    pub(crate) max_features: usize,
    pub(crate) min_samples: usize,
    pub(crate) parallel: usize,
    pub(crate) learning_rate: f64,
    pub(crate) seed: u64,
}

impl ForestConfig {
    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, RfError> {
        if n_trees == 0 {
            return Err(RfError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            max_depth: 12,
            max_records: 10_000,
            max_features: 60,
            min_samples: 3,
            parallel: 2,
            learning_rate: 0.0,
            seed: 42,
        })
    }

    // --- Setters ---

    /// Set the maximum tree depth (root is depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the maximum number of bootstrap records drawn per tree.
    #[must_use]
    pub fn with_max_records(mut self, max_records: usize) -> Self {
        self.max_records = max_records;
        self
    }

    /// Set the maximum number of features sampled per tree.
    ///
    /// The sampled subset is fixed for every split in that tree.
    #[must_use]
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the node size at or below which splitting stops.
    #[must_use]
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    /// Set the maximum number of trees trained concurrently.
    #[must_use]
    pub fn with_parallel(mut self, parallel: usize) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the reserved learning rate. Tree induction never reads it.
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Return the maximum tree depth.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Return the maximum bootstrap records per tree.
    #[must_use]
    pub fn max_records(&self) -> usize {
        self.max_records
    }

    /// Return the maximum features sampled per tree.
    #[must_use]
    pub fn max_features(&self) -> usize {
        self.max_features
    }

    /// Return the node size at or below which splitting stops.
    #[must_use]
    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Return the concurrency bound for tree training.
    #[must_use]
    pub fn parallel(&self) -> usize {
        self.parallel
    }

    /// Return the reserved learning rate.
    #[must_use]
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a Random Forest on the provided dataset.
    ///
    /// `features[sample_idx][feature_idx]` is row-major;
    /// `labels[sample_idx]` holds class ids.
    ///
    /// # Errors
    ///
    /// Fails with a validation variant (see [`RfError::is_validation`]) when
    /// a hyperparameter is zero, the dataset is empty, the label count
    /// differs from the sample count, or rows have zero or inconsistent
    /// feature counts. Fails with [`RfError::ThreadPool`] if the worker pool
    /// cannot be created. No partial model is ever returned.
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<RandomForest, RfError> {
        crate::forest::train(self, features, labels)
    }
}
