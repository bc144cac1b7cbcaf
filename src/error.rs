/// Error types shared by the loading, extraction and output stages
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("series '{field}' has {actual} samples, expected {expected} (all sensor series must be aligned)")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("required sensor field '{0}' is missing from the input")]
    MissingField(String),

    #[error("sensor field '{name}' cannot be used: {reason}")]
    UnsupportedField { name: String, reason: String },

    #[error("unsupported input format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("failed to parse MAT file: {0}")]
    Mat(String),

    #[error("chart rendering failed: {0}")]
    Render(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProfileError>;
