use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use canopy_io::{Dataset, ExperimentName, IdxReader, ResultWriter};
use canopy_rf::{AccuracyReport, ForestConfig, RandomForest};

#[derive(Parser)]
#[command(name = "canopy")]
#[command(about = "Random forest classification of IDX image datasets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,
}

/// Forest hyperparameters.
#[derive(Args, Debug, Clone)]
struct ForestArgs {
    /// Number of trees in the ensemble
    #[arg(long, default_value_t = 10)]
    trees: usize,

    /// Maximum depth of each tree (root is depth 0)
    #[arg(long, default_value_t = 12)]
    max_depth: usize,

    /// Maximum bootstrap records drawn per tree
    #[arg(long, default_value_t = 10000)]
    max_records: usize,

    /// Maximum features considered per tree
    #[arg(long, default_value_t = 60)]
    max_features: usize,

    /// Nodes with this many samples or fewer become leaves
    #[arg(long, default_value_t = 3)]
    min_samples: usize,

    /// Maximum number of trees trained concurrently
    #[arg(long, default_value_t = 2)]
    parallel: usize,

    /// Reserved; stored but unused by training
    #[arg(long, default_value_t = 0.0)]
    learning_rate: f64,
}

#[derive(Subcommand)]
enum Command {
    /// Train a forest, report accuracy, and save the model
    Train {
        /// IDX image file for training
        #[arg(long)]
        train_images: PathBuf,

        /// IDX label file for training
        #[arg(long)]
        train_labels: PathBuf,

        /// IDX image file for the held-out test set
        #[arg(long, requires = "test_labels")]
        test_images: Option<PathBuf>,

        /// IDX label file for the held-out test set
        #[arg(long, requires = "test_images")]
        test_labels: Option<PathBuf>,

        /// Read at most this many records from each dataset
        #[arg(long)]
        limit: Option<usize>,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        forest: ForestArgs,
    },

    /// Report the accuracy of a saved model on an IDX dataset
    Evaluate {
        /// Path to a model written by `train`
        #[arg(long)]
        model: PathBuf,

        /// IDX image file
        #[arg(long)]
        images: PathBuf,

        /// IDX label file
        #[arg(long)]
        labels: PathBuf,

        /// Read at most this many records
        #[arg(long)]
        limit: Option<usize>,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct TrainOutput {
    experiment: String,
    n_train: usize,
    n_test: Option<usize>,
    n_trees: usize,
    n_features: usize,
    n_classes: usize,
    train_accuracy: f64,
    test_accuracy: Option<f64>,
    training_secs: f64,
    model_path: PathBuf,
    evaluation_path: PathBuf,
}

#[derive(Serialize)]
struct EvaluateOutput {
    model_path: PathBuf,
    n_samples: usize,
    model_n_trees: usize,
    model_n_features: usize,
    model_n_classes: usize,
    accuracy: f64,
    correct: usize,
    total: usize,
}

fn build_config(args: &ForestArgs, seed: u64) -> Result<ForestConfig> {
    let config = ForestConfig::new(args.trees)
        .context("invalid forest configuration")?
        .with_max_depth(args.max_depth)
        .with_max_records(args.max_records)
        .with_max_features(args.max_features)
        .with_min_samples(args.min_samples)
        .with_parallel(args.parallel)
        .with_learning_rate(args.learning_rate)
        .with_seed(seed);
    Ok(config)
}

fn read_dataset(images: &Path, labels: &Path, limit: Option<usize>, what: &str) -> Result<Dataset> {
    let dataset = IdxReader::new(images, labels)
        .with_limit(limit)
        .read()
        .with_context(|| format!("failed to read {what} dataset"))?;
    info!(
        n_samples = dataset.n_samples(),
        n_features = dataset.n_features(),
        "{what} dataset loaded"
    );
    Ok(dataset)
}

fn evaluate(forest: &RandomForest, dataset: &Dataset, what: &str) -> Result<AccuracyReport> {
    let report = AccuracyReport::evaluate(forest, dataset.features(), dataset.labels())
        .with_context(|| format!("failed to evaluate on {what} dataset"))?;
    info!(
        correct = report.correct(),
        total = report.total(),
        accuracy = report.accuracy(),
        "{what} accuracy"
    );
    eprintln!("{what} accuracy:\n{report}");
    Ok(report)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Train {
            train_images,
            train_labels,
            test_images,
            test_labels,
            limit,
            experiment,
            output_dir,
            forest: forest_args,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;
            let config = build_config(&forest_args, cli.seed)?;

            // 1. Read datasets
            let train = read_dataset(&train_images, &train_labels, limit, "train")?;
            let test = match (test_images, test_labels) {
                (Some(images), Some(labels)) => Some(read_dataset(&images, &labels, limit, "test")?),
                _ => None,
            };

            // 2. Train
            let start = Instant::now();
            let forest = config
                .fit(train.features(), train.labels())
                .context("training failed")?;
            let training_secs = start.elapsed().as_secs_f64();

            // 3. Evaluate
            let train_report = evaluate(&forest, &train, "train")?;
            let test_report = test
                .as_ref()
                .map(|dataset| evaluate(&forest, dataset, "test"))
                .transpose()?;

            // 4. Persist
            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            let model_path = writer.model_path();
            forest.save(&model_path).context("failed to save model")?;
            let evaluation_path = writer.write_evaluation(
                &config,
                &forest,
                &train_report,
                test_report.as_ref(),
                training_secs,
            )?;

            // 5. Print summary
            let output = TrainOutput {
                experiment,
                n_train: train.n_samples(),
                n_test: test.as_ref().map(Dataset::n_samples),
                n_trees: forest.n_trees(),
                n_features: forest.n_features(),
                n_classes: forest.n_classes(),
                train_accuracy: train_report.accuracy(),
                test_accuracy: test_report.as_ref().map(AccuracyReport::accuracy),
                training_secs,
                model_path,
                evaluation_path,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Evaluate {
            model,
            images,
            labels,
            limit,
        } => {
            let forest = RandomForest::load(&model).context("failed to load model")?;
            info!(
                n_trees = forest.n_trees(),
                n_features = forest.n_features(),
                n_classes = forest.n_classes(),
                "model loaded"
            );

            let dataset = read_dataset(&images, &labels, limit, "evaluation")?;
            let report = evaluate(&forest, &dataset, "evaluation")?;

            let output = EvaluateOutput {
                model_path: model,
                n_samples: dataset.n_samples(),
                model_n_trees: forest.n_trees(),
                model_n_features: forest.n_features(),
                model_n_classes: forest.n_classes(),
                accuracy: report.accuracy(),
                correct: report.correct(),
                total: report.total(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
