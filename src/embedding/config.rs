use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_EMBEDDING_DIM, DEFAULT_MAX_SEQ_LEN};
use crate::embedding::error::EmbeddingError;

/// Files a sentence-transformers model directory must contain.
pub const MODEL_FILES: [&str; 3] = ["config.json", "model.safetensors", "tokenizer.json"];

/// Configuration for [`SentenceEmbedder`](super::SentenceEmbedder).
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedderConfig {
    /// Directory holding `config.json`, `model.safetensors` and `tokenizer.json`.
    pub model_dir: PathBuf,
    /// Max tokens per text; longer input is truncated.
    pub max_seq_len: usize,
    /// Output dimension; must match the model's hidden size.
    pub embedding_dim: usize,
    /// Try Metal/CUDA before the CPU (only when compiled with those features).
    pub use_gpu: bool,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::new(),
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            use_gpu: true,
            testing_stub: false,
        }
    }
}

impl EmbedderConfig {
    /// Env var used to locate the model directory.
    pub const ENV_MODEL_PATH: &'static str = "PAPER_MODEL_PATH";

    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: model_dir.into(),
            ..Default::default()
        }
    }

    /// Creates a stub config (no model files; produces deterministic embeddings).
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.max_seq_len == 0 || self.embedding_dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "max_seq_len and embedding_dim must be positive, got {} and {}",
                    self.max_seq_len, self.embedding_dim
                ),
            });
        }

        if self.testing_stub {
            return Ok(());
        }

        if self.model_dir.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "model directory is required (set {} or enable stub mode)",
                    Self::ENV_MODEL_PATH
                ),
            });
        }

        if let Some(missing) = self.missing_model_file() {
            return Err(EmbeddingError::ModelNotFound { path: missing });
        }

        Ok(())
    }

    /// First required model file that does not exist, if any.
    pub fn missing_model_file(&self) -> Option<PathBuf> {
        if !self.model_dir.is_dir() {
            return Some(self.model_dir.clone());
        }
        MODEL_FILES
            .iter()
            .map(|name| self.model_dir.join(name))
            .find(|path| !Path::exists(path))
    }

    pub fn model_available(&self) -> bool {
        !self.model_dir.as_os_str().is_empty() && self.missing_model_file().is_none()
    }
}
