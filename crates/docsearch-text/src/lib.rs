//! docsearch-text
//!
//! Lexical (BM25) retrieval over the chunk corpus, backed by an in-RAM tantivy
//! index that is rebuilt from chunk text whenever a corpus is built or loaded.

pub mod lexical;
pub mod tantivy_utils;

pub use lexical::LexicalIndex;
pub use tantivy_utils::tokenize;
