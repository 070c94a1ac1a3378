//! Hybrid retrieval over one active corpus: build and persist both indexes,
//! reload them, and answer queries with dense + lexical candidates reranked
//! by a cross-encoder.

pub mod builder;
pub mod corpus;
pub mod loader;
pub mod persist;
pub mod retrieval;
pub mod service;

pub use builder::IndexBuilder;
pub use corpus::{CorpusHandle, CorpusState, CorpusSummary};
pub use loader::{load_corpus, load_embeddings};
pub use service::{BuildReport, SearchResponse, SearchResult, SearchService};
