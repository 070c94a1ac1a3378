use std::sync::Arc;

use crate::error::Result;

/// Sentence embedding capability. Implementations must return one
/// L2-normalized vector of length `dim()` per input text, in input order.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the model (e.g. `bge-m3:d1024`).
    fn embedder_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Cross-encoder relevance capability: scores every `(query, text)` pair in a
/// single call and returns one score per text, higher meaning more relevant.
pub trait Reranker: Send + Sync {
    fn rerank(&self, query: &str, texts: &[String]) -> anyhow::Result<Vec<f32>>;
}

/// Minimal key/value blob storage for persisted corpus artifacts.
///
/// `put` must replace the value atomically: a reader observes either the old
/// bytes or the new bytes, never a truncated mix.
pub trait ArtifactStore: Send + Sync {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    /// Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<()>;
}

impl<T: ArtifactStore + ?Sized> ArtifactStore for Arc<T> {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        (**self).put(key, bytes)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }
}
