//! Random Forest classification: train, classify, evaluate, persist.
//!
//! Each tree is grown on a bootstrap sample with a feature subset fixed for
//! the whole tree, splitting greedily on the threshold that minimizes
//! weighted Shannon entropy. Trees are trained on a bounded rayon pool and
//! the ensemble classifies by unweighted majority vote.

mod accuracy;
mod config;
mod error;
mod forest;
mod histogram;
mod matrix;
mod node;
mod predict;
mod sample;
mod serialize;
mod split;
mod tree;
mod validate;

pub use accuracy::{AccuracyReport, ClassAccuracy};
pub use config::ForestConfig;
pub use error::RfError;
pub use forest::RandomForest;
pub use node::{FeatureIndex, Node};
pub use predict::Prediction;
pub use tree::DecisionTree;
