use std::collections::HashMap;

use parking_lot::Mutex;

use super::Embedder;
use super::error::EmbeddingError;
use super::stub::stub_embedding;

/// Test embedder: exact text → vector table with a deterministic stub fallback.
///
/// Records every text it was asked to embed.
#[derive(Debug, Default)]
pub struct MockEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    dim: usize,
    calls: Mutex<Vec<String>>,
}

impl MockEmbedder {
    pub fn new(dim: usize) -> Self {
        Self {
            vectors: HashMap::new(),
            dim,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Registers the vector returned for `text`; it is padded or truncated to the
    /// embedder's dimension.
    pub fn with_vector(mut self, text: impl Into<String>, vector: impl Into<Vec<f32>>) -> Self {
        let mut vector = vector.into();
        vector.resize(self.dim, 0.0);
        self.vectors.insert(text.into(), vector);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Embedder for MockEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.lock().push(text.to_string());
        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| stub_embedding(text, self.dim)))
    }

    fn embedding_dim(&self) -> usize {
        self.dim
    }
}
