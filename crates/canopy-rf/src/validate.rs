//! Structural checks on training inputs, run before any sampling.

use crate::config::ForestConfig;
use crate::error::RfError;

/// Check hyperparameters and dataset shape.
///
/// Returns the feature dimension (length of the first row) on success.
/// Pure: no randomness is drawn and nothing is allocated beyond the error.
pub(crate) fn validate_inputs(
    config: &ForestConfig,
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<usize, RfError> {
    validate_config(config)?;

    if features.is_empty() {
        return Err(RfError::EmptyDataset);
    }
    let n_samples = features.len();
    if labels.len() != n_samples {
        return Err(RfError::LabelCountMismatch {
            labels: labels.len(),
            samples: n_samples,
        });
    }
    let n_features = features[0].len();
    if n_features == 0 {
        return Err(RfError::ZeroFeatures);
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(RfError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(RfError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
    }
    Ok(n_features)
}

fn validate_config(config: &ForestConfig) -> Result<(), RfError> {
    if config.n_trees == 0 {
        return Err(RfError::InvalidTreeCount {
            n_trees: config.n_trees,
        });
    }
    if config.max_depth == 0 {
        return Err(RfError::InvalidMaxDepth {
            max_depth: config.max_depth,
        });
    }
    if config.max_records == 0 {
        return Err(RfError::InvalidMaxRecords {
            max_records: config.max_records,
        });
    }
    if config.max_features == 0 {
        return Err(RfError::InvalidMaxFeatures {
            max_features: config.max_features,
        });
    }
    if config.min_samples == 0 {
        return Err(RfError::InvalidMinSamples {
            min_samples: config.min_samples,
        });
    }
    if config.parallel == 0 {
        return Err(RfError::InvalidParallelism {
            parallel: config.parallel,
        });
    }
    Ok(())
}
