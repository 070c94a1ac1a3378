//! Dense retrieval: an exact inner-product index over chunk embeddings and
//! the binary codecs used to persist it.

pub mod codec;
pub mod index;

pub use codec::EmbeddingMatrix;
pub use index::{DenseIndex, Neighbor, MISSING};
