//! Error types for the zonal-daa library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum ZonalError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input file not found: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("Malformed row {row} in {}: {reason}", file.display())]
    MalformedRow {
        file: PathBuf,
        row: usize,
        reason: String,
    },

    #[error("Invalid count value '{value}' in {} at row {row}, column {col}", file.display())]
    InvalidCount {
        file: PathBuf,
        value: String,
        row: usize,
        col: usize,
    },

    #[error("Replicate {replicate} of zone {zone} has zero total counts, cannot correct depth")]
    ZeroDepthReplicate { zone: String, replicate: usize },

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, ZonalError>;
