//! Domain types shared by the chunker, both indexes and the retrieval engine.

use serde::{Deserialize, Serialize};

/// Position of a chunk in the corpus-wide chunk list.
///
/// This is the join key between the dense index, the lexical index and the
/// persisted chunk list, so it must be identical across build and reload.
pub type ChunkIndex = usize;

/// One non-empty page of extracted document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub source_name: String,
    /// 1-based page number in the source document.
    pub page_number: u32,
    pub text: String,
}

/// A page-scoped window of words; the atomic retrieval unit.
///
/// Serialized as `{source_name, page_number, text}` in the persisted chunk list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub source_name: String,
    pub page_number: u32,
    pub text: String,
}

/// Indicates which first-stage retriever produced a hit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SourceKind {
    Vector,
    Text,
}

/// A first-stage candidate. `score` is retriever-specific but higher is
/// always better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub chunk_index: ChunkIndex,
    pub score: f32,
    pub source: SourceKind,
}

/// A final, reranked result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedChunk {
    pub chunk_index: ChunkIndex,
    /// Cross-encoder relevance; supersedes both first-stage scores.
    pub score: f32,
    pub chunk: Chunk,
}
