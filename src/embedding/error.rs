use std::path::PathBuf;
use thiserror::Error;

/// Failures of the embedding collaborator. Any of them aborts scoring of the submission.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// A model directory or one of its required files is missing.
    #[error("sentence model file missing: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("cannot load sentence model: {reason}")]
    ModelLoadFailed { reason: String },

    /// Forward pass or pooling failed for a text.
    #[error("cannot embed text: {reason}")]
    InferenceFailed { reason: String },

    #[error("cannot tokenize text: {reason}")]
    TokenizationFailed { reason: String },

    #[error("invalid embedder configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<candle_core::Error> for EmbeddingError {
    fn from(err: candle_core::Error) -> Self {
        Self::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for EmbeddingError {
    fn from(err: std::io::Error) -> Self {
        Self::ModelLoadFailed {
            reason: format!("model files unreadable: {}", err),
        }
    }
}
