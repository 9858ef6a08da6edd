//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::segmentation::SegmentationError;
use crate::valuation::ValuationError;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable is set but cannot be parsed.
    #[error("invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A parsed value is outside its allowed range.
    #[error("{name} is out of range ({value}): expected {expected}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        expected: &'static str,
    },

    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error(transparent)]
    Segmentation(#[from] SegmentationError),

    #[error(transparent)]
    Valuation(#[from] ValuationError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}
