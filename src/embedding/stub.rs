//! Deterministic bag-of-words embeddings for stub mode.
//!
//! Every content word is hashed with BLAKE3 into one signed bucket of the output vector,
//! so texts sharing vocabulary land close together and identical texts are identical.
//! Stop words are ignored.

use std::collections::HashSet;
use std::sync::LazyLock;

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has",
        "had", "do", "does", "did", "will", "would", "could", "should", "may", "might", "must",
        "shall", "can", "to", "of", "in", "for", "on", "with", "at", "by", "from", "as", "into",
        "through", "during", "before", "after", "then", "once", "here", "there", "when", "where",
        "why", "how", "all", "each", "more", "most", "other", "some", "such", "no", "nor", "not",
        "only", "so", "than", "too", "very", "just", "and", "but", "if", "or", "because",
        "while", "what", "which", "who", "this", "that", "these", "those", "it", "its",
    ]
    .into_iter()
    .collect()
});

/// Lowercased content words of `text`.
pub fn content_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Unit-length hashed bag-of-words vector; all zeros when `text` has no content words.
pub fn stub_embedding(text: &str, dim: usize) -> Vec<f32> {
    let mut embedding = vec![0.0f32; dim];
    if dim == 0 {
        return embedding;
    }

    for word in content_words(text) {
        let hash = blake3::hash(word.as_bytes());
        let bytes = hash.as_bytes();
        let mut bucket = [0u8; 8];
        bucket.copy_from_slice(&bytes[..8]);
        let index = (u64::from_le_bytes(bucket) % dim as u64) as usize;
        let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
        embedding[index] += sign;
    }

    normalize(&mut embedding);
    embedding
}

/// Scales `v` to unit L2 norm in place; zero vectors are left untouched.
pub fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
