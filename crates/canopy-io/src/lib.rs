//! Dataset loading and result serialization for the canopy pipeline.

mod domain;
mod error;
mod idx;
mod writer;

pub use domain::{Dataset, ExperimentName};
pub use error::IoError;
pub use idx::IdxReader;
pub use writer::ResultWriter;
