use std::path::PathBuf;

use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum ValuationError {
    #[error("invalid mark curve: {reason}")]
    InvalidCurve { reason: String },

    #[error("invalid exam configuration: {reason}")]
    InvalidExam { reason: String },

    #[error("marks list has {found} entries but the exam has {expected} questions")]
    MarkCountMismatch { expected: usize, found: usize },

    #[error("invalid mark '{value}': expected a positive number")]
    InvalidMark { value: String },

    #[error("invalid question id '{value}'")]
    InvalidQuestionId { value: String },

    #[error("question {question} has no reference key points")]
    EmptyReference { question: String },

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("failed to read exam record {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse exam record: {0}")]
    Parse(#[from] serde_json::Error),
}
