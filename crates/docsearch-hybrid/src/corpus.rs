//! The live corpus and the handle that swaps it.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use docsearch_core::types::{Chunk, ChunkIndex};
use docsearch_text::LexicalIndex;
use docsearch_vector::DenseIndex;

/// One built or loaded document set: chunk list plus both indexes over it.
///
/// Row `i` of the dense index and document `i` of the lexical index both
/// describe `chunks[i]`.
pub struct CorpusState {
    chunks: Vec<Chunk>,
    dense: DenseIndex,
    lexical: LexicalIndex,
    generation: u64,
    embedder_id: String,
}

impl CorpusState {
    /// Fails unless all three parts have the same length.
    pub fn new(
        chunks: Vec<Chunk>,
        dense: DenseIndex,
        lexical: LexicalIndex,
        generation: u64,
        embedder_id: impl Into<String>,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            chunks.len() == dense.len() && chunks.len() == lexical.len(),
            "corpus parts disagree: {} chunks, {} vectors, {} lexical docs",
            chunks.len(),
            dense.len(),
            lexical.len()
        );
        Ok(Self { chunks, dense, lexical, generation, embedder_id: embedder_id.into() })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunk(&self, index: ChunkIndex) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    pub fn dense(&self) -> &DenseIndex {
        &self.dense
    }

    pub fn lexical(&self) -> &LexicalIndex {
        &self.lexical
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn summary(&self) -> CorpusSummary {
        CorpusSummary {
            chunk_count: self.len(),
            dim: self.dense.dim(),
            generation: self.generation,
            embedder_id: self.embedder_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusSummary {
    pub chunk_count: usize,
    pub dim: usize,
    pub generation: u64,
    pub embedder_id: String,
}

/// Shared slot holding the live corpus. Readers clone the `Arc` and keep
/// searching that snapshot even if a rebuild swaps in a new one meanwhile.
#[derive(Default)]
pub struct CorpusHandle {
    live: RwLock<Option<Arc<CorpusState>>>,
}

impl CorpusHandle {
    pub fn new(initial: Option<CorpusState>) -> Self {
        Self { live: RwLock::new(initial.map(Arc::new)) }
    }

    pub fn snapshot(&self) -> Option<Arc<CorpusState>> {
        self.live.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn replace(&self, state: CorpusState) -> Option<Arc<CorpusState>> {
        let mut live = self.live.write().unwrap_or_else(PoisonError::into_inner);
        live.replace(Arc::new(state))
    }
}
