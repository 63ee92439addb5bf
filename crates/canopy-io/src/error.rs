//! I/O error types for canopy-io.

use std::path::PathBuf;

/// Errors from IDX parsing and result serialization.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the IDX magic number does not match the expected file kind.
    #[error("bad IDX magic number in {path}: expected {expected:#010x}, found {found:#010x}")]
    BadMagic {
        /// Path to the IDX file.
        path: PathBuf,
        /// Magic number for the expected file kind.
        expected: u32,
        /// Magic number read from the file.
        found: u32,
    },

    /// Returned when the file ends before the header or payload is complete.
    #[error("truncated IDX file {path}: need {expected} bytes, found {got}")]
    Truncated {
        /// Path to the IDX file.
        path: PathBuf,
        /// Number of bytes the header promises.
        expected: usize,
        /// Number of bytes present.
        got: usize,
    },

    /// Returned when header dimensions multiply past the addressable size.
    #[error("IDX header dimensions in {path} overflow the payload size")]
    HeaderOverflow {
        /// Path to the IDX file.
        path: PathBuf,
    },

    /// Returned when an image file declares zero records or zero pixels per record.
    #[error("empty dataset in {path}")]
    EmptyDataset {
        /// Path to the IDX file.
        path: PathBuf,
    },

    /// Returned when the image and label files hold different record counts.
    #[error("image file has {images} records but label file has {labels}")]
    CountMismatch {
        /// Records in the image file (after any limit).
        images: usize,
        /// Records in the label file (after any limit).
        labels: usize,
    },

    /// Returned when the experiment name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid experiment name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidExperimentName {
        /// The invalid name.
        name: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result artifact cannot be encoded as JSON.
    #[error("cannot encode {path} as JSON")]
    SerializeJson {
        /// Destination path of the artifact.
        path: PathBuf,
        /// Underlying serde_json error.
        source: serde_json::Error,
    },
}
