use thiserror::Error;

/// Failure categories surfaced to callers of build and search.
///
/// `Input`, `NotIndexed`, `Persistence` and `Inference` are distinct so a
/// request shell can map each to its own response without string matching.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("No corpus indexed")]
    NotIndexed,

    #[error("Persistence failed for '{key}': {reason}")]
    Persistence { key: String, reason: String },

    #[error("Model inference failed: {0}")]
    Inference(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    pub fn persistence(key: &str, reason: impl std::fmt::Display) -> Self {
        Self::Persistence { key: key.to_string(), reason: reason.to_string() }
    }

    /// Wraps an embedder or reranker failure, keeping the full context chain.
    pub fn inference(err: anyhow::Error) -> Self {
        Self::Inference(format!("{err:#}"))
    }

    pub fn operation(err: anyhow::Error) -> Self {
        Self::Operation(format!("{err:#}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
