//! In-memory embedding cache keyed by a BLAKE3 hash of the text.
//!
//! Reference key points are embedded once per student otherwise; caching them keeps a
//! class-sized grading run from re-encoding the same answer key. Scores are unchanged.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use moka::sync::Cache;
use tracing::debug;

use super::Embedder;
use super::error::EmbeddingError;

/// 32-byte BLAKE3 digest of `text`.
#[inline]
pub fn hash_text(text: &str) -> [u8; 32] {
    *blake3::hash(text.as_bytes()).as_bytes()
}

/// Hit/miss counters of a [`CachedEmbedder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Wraps any [`Embedder`] with a bounded LRU cache. Capacity 0 disables caching.
pub struct CachedEmbedder<E> {
    inner: E,
    entries: Option<Cache<[u8; 32], Arc<Vec<f32>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<E: Embedder> CachedEmbedder<E> {
    pub fn new(inner: E, capacity: u64) -> Self {
        let entries = (capacity > 0).then(|| Cache::builder().max_capacity(capacity).build());
        Self {
            inner,
            entries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Number of cached vectors (approximate while moka runs pending maintenance).
    pub fn len(&self) -> u64 {
        self.entries.as_ref().map_or(0, |c| {
            c.run_pending_tasks();
            c.entry_count()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: Embedder> Embedder for CachedEmbedder<E> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let Some(entries) = &self.entries else {
            return self.inner.embed(text);
        };

        let key = hash_text(text);
        if let Some(hit) = entries.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit.as_ref().clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let embedding = self.inner.embed(text)?;
        entries.insert(key, Arc::new(embedding.clone()));
        debug!(text_len = text.len(), "Cached embedding");
        Ok(embedding)
    }

    fn embedding_dim(&self) -> usize {
        self.inner.embedding_dim()
    }
}

impl<E: std::fmt::Debug> std::fmt::Debug for CachedEmbedder<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedEmbedder")
            .field("inner", &self.inner)
            .field("enabled", &self.entries.is_some())
            .finish()
    }
}
