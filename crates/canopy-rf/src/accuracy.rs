//! Per-class and aggregate accuracy over a labeled evaluation set.

use std::fmt;

use tracing::{info, instrument};

use crate::error::RfError;
use crate::forest::RandomForest;

/// Correct and total counts for one true class.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ClassAccuracy {
    /// The true class id.
    pub label: usize,
    /// Samples of this class that were classified correctly.
    pub correct: usize,
    /// Samples of this class in the evaluation set.
    pub total: usize,
}

impl ClassAccuracy {
    /// Proportion of this class classified correctly. 0.0 if the class is absent.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// Accuracy of a forest on a labeled dataset, broken down by true class.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AccuracyReport {
    per_class: Vec<ClassAccuracy>,
    correct: usize,
    total: usize,
}

impl AccuracyReport {
    /// Classify every row of `features` and compare against `labels`.
    ///
    /// Classes are reported from 0 up to the larger of the forest's class
    /// count and the largest evaluation label.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | Zero samples provided |
    /// | [`RfError::LabelCountMismatch`] | `labels.len() != features.len()` |
    /// | [`RfError::DimensionMismatch`] | A row has the wrong feature count |
    #[instrument(skip_all, fields(n_samples = features.len()))]
    pub fn evaluate(
        forest: &RandomForest,
        features: &[Vec<f64>],
        labels: &[usize],
    ) -> Result<Self, RfError> {
        if features.is_empty() {
            return Err(RfError::EmptyDataset);
        }
        if labels.len() != features.len() {
            return Err(RfError::LabelCountMismatch {
                labels: labels.len(),
                samples: features.len(),
            });
        }
        let predictions = forest.classify_batch(features)?;
        let predicted: Vec<usize> = predictions.iter().map(|p| p.label).collect();
        let n_classes = labels
            .iter()
            .max()
            .map_or(0, |&m| m + 1)
            .max(forest.n_classes());
        let report = Self::from_labels(labels, &predicted, n_classes);

        info!(
            correct = report.correct,
            total = report.total,
            accuracy = report.accuracy(),
            "evaluation complete"
        );
        Ok(report)
    }

    /// Tally true vs. predicted labels. Both slices must have equal length
    /// and every true label must be below `n_classes`.
    #[must_use]
    pub fn from_labels(true_labels: &[usize], predicted: &[usize], n_classes: usize) -> Self {
        let mut per_class: Vec<ClassAccuracy> = (0..n_classes)
            .map(|label| ClassAccuracy {
                label,
                correct: 0,
                total: 0,
            })
            .collect();
        for (&t, &p) in true_labels.iter().zip(predicted) {
            per_class[t].total += 1;
            if t == p {
                per_class[t].correct += 1;
            }
        }
        let correct = per_class.iter().map(|c| c.correct).sum();
        let total = per_class.iter().map(|c| c.total).sum();
        Self {
            per_class,
            correct,
            total,
        }
    }

    /// Overall accuracy: proportion of correct predictions.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    /// Per-class breakdown, indexed by class id.
    #[must_use]
    pub fn per_class(&self) -> &[ClassAccuracy] {
        &self.per_class
    }

    /// Number of correctly classified samples.
    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    /// Number of evaluated samples.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }
}

impl fmt::Display for AccuracyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for class in &self.per_class {
            writeln!(
                f,
                "{}: {}/{} ({:.2}%)",
                class.label,
                class.correct,
                class.total,
                class.accuracy() * 100.0
            )?;
        }
        write!(
            f,
            "Total: {}/{} ({:.2}%)",
            self.correct,
            self.total,
            self.accuracy() * 100.0
        )
    }
}
