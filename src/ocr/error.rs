use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("failed to read word list at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed word list: {reason}")]
    Malformed { reason: String },

    #[error("recognition failed: {reason}")]
    RecognitionFailed { reason: String },
}

impl From<serde_json::Error> for OcrError {
    fn from(err: serde_json::Error) -> Self {
        OcrError::Malformed {
            reason: err.to_string(),
        }
    }
}
