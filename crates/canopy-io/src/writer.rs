//! JSON result writer for training and evaluation runs.

use std::fs;
use std::path::{Path, PathBuf};

use canopy_rf::{AccuracyReport, ForestConfig, RandomForest};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::ExperimentName;

/// Writes run artifacts into one output directory.
///
/// Creates the output directory on construction if it does not exist.
/// The evaluation artifact is `{experiment}_evaluation.json`; the model
/// binary lives next to it at `{experiment}_model.bin`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Write training parameters and accuracy reports to
    /// `{experiment}_evaluation.json`, returning the written path.
    ///
    /// `test` is omitted from the artifact (serialized as `null`) when no
    /// held-out set was evaluated.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::SerializeJson`] | JSON encoding failed |
    /// | [`IoError::WriteFile`] | file write failed |
    #[instrument(skip_all)]
    pub fn write_evaluation(
        &self,
        config: &ForestConfig,
        forest: &RandomForest,
        train: &AccuracyReport,
        test: Option<&AccuracyReport>,
        training_secs: f64,
    ) -> Result<PathBuf, IoError> {
        let path = self
            .output_dir
            .join(format!("{}_evaluation.json", self.experiment.as_str()));

        let artifact = EvaluationArtifact {
            experiment: self.experiment.as_str(),
            params: ParamsEntry {
                n_trees: config.n_trees(),
                max_depth: config.max_depth(),
                max_records: config.max_records(),
                max_features: config.max_features(),
                min_samples: config.min_samples(),
                parallel: config.parallel(),
                learning_rate: config.learning_rate(),
                seed: config.seed(),
            },
            model: ModelEntry {
                n_trees: forest.n_trees(),
                n_features: forest.n_features(),
                n_classes: forest.n_classes(),
                n_nodes: forest.trees().iter().map(|t| t.n_nodes()).sum(),
                max_tree_depth: forest.trees().iter().map(|t| t.depth()).max().unwrap_or(0),
                training_secs,
            },
            train: ReportEntry::from(train),
            test: test.map(ReportEntry::from),
        };

        let json = serde_json::to_string_pretty(&artifact).map_err(|e| IoError::SerializeJson {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "evaluation result written");
        Ok(path)
    }

    /// Return the path where the model binary should be saved.
    ///
    /// Does not write anything; just computes `{output_dir}/{experiment}_model.bin`.
    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_model.bin", self.experiment.as_str()))
    }
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct EvaluationArtifact<'a> {
    experiment: &'a str,
    params: ParamsEntry,
    model: ModelEntry,
    train: ReportEntry,
    test: Option<ReportEntry>,
}

#[derive(Serialize)]
struct ParamsEntry {
    n_trees: usize,
    max_depth: usize,
    max_records: usize,
    max_features: usize,
    min_samples: usize,
    parallel: usize,
    learning_rate: f64,
    seed: u64,
}

#[derive(Serialize)]
struct ModelEntry {
    n_trees: usize,
    n_features: usize,
    n_classes: usize,
    n_nodes: usize,
    max_tree_depth: usize,
    training_secs: f64,
}

#[derive(Serialize)]
struct ReportEntry {
    accuracy: f64,
    correct: usize,
    total: usize,
    per_class: Vec<ClassEntry>,
}

#[derive(Serialize)]
struct ClassEntry {
    label: usize,
    correct: usize,
    total: usize,
    accuracy: f64,
}

impl From<&AccuracyReport> for ReportEntry {
    fn from(report: &AccuracyReport) -> Self {
        Self {
            accuracy: report.accuracy(),
            correct: report.correct(),
            total: report.total(),
            per_class: report
                .per_class()
                .iter()
                .map(|c| ClassEntry {
                    label: c.label,
                    correct: c.correct,
                    total: c.total,
                    accuracy: c.accuracy(),
                })
                .collect(),
        }
    }
}
