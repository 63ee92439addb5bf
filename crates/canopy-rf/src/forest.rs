//! Random Forest training with bounded-parallel tree construction.

use std::time::Instant;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::ForestConfig;
use crate::error::RfError;
use crate::matrix::SampleMatrix;
use crate::sample::{sample_with_replacement, sample_without_replacement};
use crate::tree::{DecisionTree, TreeBuilder};
use crate::validate::validate_inputs;

/// A fitted Random Forest ensemble.
///
/// Immutable once [`ForestConfig::fit`] returns; classification borrows it
/// read-only and may run from any number of threads.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
}

/// Read-only inputs shared by every tree task.
struct TrainContext<'a> {
    matrix: &'a SampleMatrix,
    labels: &'a [usize],
    n_classes: usize,
    draw_count: usize,
    subset_size: usize,
    max_depth: usize,
    min_samples: usize,
}

impl TrainContext<'_> {
    /// Draw this tree's bootstrap sample and feature subset, then grow it.
    fn train_tree(&self, tree_id: usize, seed: u64) -> DecisionTree {
        let start = Instant::now();
        debug!(tree_id, "training tree");

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut samples = sample_with_replacement(self.matrix.n_samples(), self.draw_count, &mut rng);
        let features = sample_without_replacement(self.matrix.n_features(), self.subset_size, &mut rng);

        let builder = TreeBuilder {
            matrix: self.matrix,
            labels: self.labels,
            features: &features,
            n_classes: self.n_classes,
            max_depth: self.max_depth,
            min_samples: self.min_samples,
        };
        let tree = builder.grow(&mut samples);

        debug!(
            tree_id,
            n_nodes = tree.n_nodes(),
            depth = tree.depth(),
            elapsed_secs = start.elapsed().as_secs_f64(),
            "done training tree"
        );
        tree
    }
}

/// Train the Random Forest ensemble.
///
/// Runs one task per tree on a dedicated pool of `parallel` threads, so at
/// most `parallel` trees are grown at once. Each task writes only its own
/// slot of the output vector, and the call returns after every task joins.
/// A task that never finishes blocks this call indefinitely.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = features.len()))]
pub(crate) fn train(
    config: &ForestConfig,
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<RandomForest, RfError> {
    let n_features = validate_inputs(config, features, labels)?;
    let n_samples = features.len();
    let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;
    let draw_count = n_samples.min(config.max_records);
    let subset_size = n_features.min(config.max_features);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.parallel)
        .thread_name(|i| format!("canopy-tree-{i}"))
        .build()
        .map_err(|source| RfError::ThreadPool {
            parallel: config.parallel,
            source,
        })?;

    info!(
        n_trees = config.n_trees,
        n_samples,
        n_features,
        n_classes,
        draw_count,
        subset_size,
        parallel = config.parallel,
        "training random forest"
    );

    let start = Instant::now();
    let matrix = SampleMatrix::from_rows(features, n_features);

    // Per-tree seeds come from one master stream, so results do not depend
    // on which worker finishes first.
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master_rng.r#gen()).collect();

    let ctx = TrainContext {
        matrix: &matrix,
        labels,
        n_classes,
        draw_count,
        subset_size,
        max_depth: config.max_depth,
        min_samples: config.min_samples,
    };

    let mut trees: Vec<DecisionTree> = Vec::with_capacity(config.n_trees);
    pool.install(|| {
        tree_seeds
            .into_par_iter()
            .enumerate()
            .map(|(tree_id, seed)| ctx.train_tree(tree_id, seed))
            .collect_into_vec(&mut trees);
    });

    info!(
        n_trees_trained = trees.len(),
        elapsed_secs = start.elapsed().as_secs_f64(),
        "random forest training complete"
    );

    Ok(RandomForest {
        trees,
        n_features,
        n_classes,
    })
}
