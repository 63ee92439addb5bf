use std::path::PathBuf;

/// Errors from Random Forest training, classification, and persistence.
#[derive(Debug, thiserror::Error)]
pub enum RfError {
    /// Returned when n_trees is zero.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The invalid n_trees value provided.
        n_trees: usize,
    },

    /// Returned when max_depth is zero.
    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth {
        /// The invalid max_depth value provided.
        max_depth: usize,
    },

    /// Returned when max_records is zero.
    #[error("max_records must be at least 1, got {max_records}")]
    InvalidMaxRecords {
        /// The invalid max_records value provided.
        max_records: usize,
    },

    /// Returned when max_features is zero.
    #[error("max_features must be at least 1, got {max_features}")]
    InvalidMaxFeatures {
        /// The invalid max_features value provided.
        max_features: usize,
    },

    /// Returned when min_samples is zero.
    #[error("min_samples must be at least 1, got {min_samples}")]
    InvalidMinSamples {
        /// The invalid min_samples value provided.
        min_samples: usize,
    },

    /// Returned when parallel is zero.
    #[error("parallel must be at least 1, got {parallel}")]
    InvalidParallelism {
        /// The invalid parallel value provided.
        parallel: usize,
    },

    /// Returned when the training dataset has zero samples.
    #[error("training dataset has zero samples")]
    EmptyDataset,

    /// Returned when the label count differs from the sample count.
    #[error("label count does not match sample count: labels={labels}, samples={samples}")]
    LabelCountMismatch {
        /// Number of labels provided.
        labels: usize,
        /// Number of feature rows provided.
        samples: usize,
    },

    /// Returned when the training dataset has zero feature columns.
    #[error("training dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when a sample has a different number of features than the first row.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the sample.
        got: usize,
        /// The zero-based index of the offending sample.
        sample_index: usize,
    },

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The zero-based index of the offending feature column.
        feature_index: usize,
    },

    /// Returned when a query vector's length differs from the trained feature dimension.
    #[error("feature dimension mismatch: model={expected}, input={got}")]
    DimensionMismatch {
        /// The feature dimension recorded at training time.
        expected: usize,
        /// The length of the query vector.
        got: usize,
    },

    /// Returned when the training worker pool cannot be created.
    #[error("failed to build training thread pool with {parallel} threads")]
    ThreadPool {
        /// The requested pool size.
        parallel: usize,
        /// The underlying rayon error.
        source: rayon::ThreadPoolBuildError,
    },

    /// Returned when model serialization fails.
    #[error("failed to serialize model")]
    SerializeModel {
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when model deserialization fails.
    #[error("failed to deserialize model from {path}")]
    DeserializeModel {
        /// Path to the model file that could not be deserialized.
        path: PathBuf,
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when writing the model file fails.
    #[error("failed to write model to {path}")]
    WriteModel {
        /// Path to the file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when reading the model file fails.
    #[error("failed to read model from {path}")]
    ReadModel {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when loading a model with an incompatible format version.
    #[error("incompatible model version in {path}: expected {expected}, found {found}")]
    IncompatibleModelVersion {
        /// The model format version this build expects.
        expected: u32,
        /// The model format version found in the file.
        found: u32,
        /// Path to the model file with the incompatible version.
        path: PathBuf,
    },

    /// Returned when a decoded model disagrees with its own header or
    /// references a feature or class outside its recorded dimensions.
    #[error("inconsistent model in {path}: {reason}")]
    InconsistentModel {
        /// Path to the model file.
        path: PathBuf,
        /// Which check failed.
        reason: String,
    },
}

impl RfError {
    /// Return `true` if this error was raised while validating training
    /// inputs, before any sampling or tree task started.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RfError::InvalidTreeCount { .. }
                | RfError::InvalidMaxDepth { .. }
                | RfError::InvalidMaxRecords { .. }
                | RfError::InvalidMaxFeatures { .. }
                | RfError::InvalidMinSamples { .. }
                | RfError::InvalidParallelism { .. }
                | RfError::EmptyDataset
                | RfError::LabelCountMismatch { .. }
                | RfError::ZeroFeatures
                | RfError::FeatureCountMismatch { .. }
                | RfError::NonFiniteValue { .. }
        )
    }
}
