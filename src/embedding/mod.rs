//! Embedding collaborator.
//!
//! The valuation engine only needs "text → fixed-length vector" plus cosine similarity.
//! [`SentenceEmbedder`] provides that from a local BERT-family checkpoint (or a
//! deterministic stub), [`CachedEmbedder`] memoizes any embedder, and `MockEmbedder`
//! serves exact vectors in tests.

/// BERT encoder with mean pooling.
pub mod bert;
pub mod cache;
pub mod config;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod sentence;
pub mod stub;
/// Tokenizer loading.
pub mod utils;


pub use cache::{CacheStats, CachedEmbedder, hash_text};
pub use config::EmbedderConfig;
pub use error::EmbeddingError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbedder;
pub use sentence::SentenceEmbedder;

use std::sync::Arc;

/// Text → vector. Implementations must return vectors of [`Embedder::embedding_dim`]
/// length.
pub trait Embedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    fn embedding_dim(&self) -> usize;

    /// Cosine similarity of the embeddings of `a` and `b`.
    fn similarity(&self, a: &str, b: &str) -> Result<f32, EmbeddingError> {
        Ok(cosine_similarity(&self.embed(a)?, &self.embed(b)?))
    }
}

impl<T: Embedder + ?Sized> Embedder for &T {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text)
    }

    fn embedding_dim(&self) -> usize {
        (**self).embedding_dim()
    }
}

impl<T: Embedder + ?Sized> Embedder for Arc<T> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text)
    }

    fn embedding_dim(&self) -> usize {
        (**self).embedding_dim()
    }
}

impl<T: Embedder + ?Sized> Embedder for Box<T> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text)
    }

    fn embedding_dim(&self) -> usize {
        (**self).embedding_dim()
    }
}

/// Cosine similarity in `[-1, 1]`. Returns 0 for mismatched lengths or a zero vector.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    (dot / denom).clamp(-1.0, 1.0)
}
