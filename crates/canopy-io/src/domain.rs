//! Domain types for canopy-io.

use crate::IoError;

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A labeled image dataset, flattened to one feature per pixel.
///
/// Produced by [`IdxReader`](crate::IdxReader). `features[i]` holds the
/// pixel intensities of record `i` in row-major order and `labels[i]` its
/// class id.
#[derive(Debug)]
pub struct Dataset {
    features: Vec<Vec<f64>>,
    labels: Vec<usize>,
    rows: usize,
    cols: usize,
}

impl Dataset {
    pub(crate) fn new(features: Vec<Vec<f64>>, labels: Vec<usize>, rows: usize, cols: usize) -> Self {
        debug_assert_eq!(features.len(), labels.len());
        Self {
            features,
            labels,
            rows,
            cols,
        }
    }

    /// Row-major feature matrix: `features()[sample][pixel]`.
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Class id per sample.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    /// Number of features (pixels) per sample.
    pub fn n_features(&self) -> usize {
        self.rows * self.cols
    }

    /// Image height and width in pixels.
    pub fn image_shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}
