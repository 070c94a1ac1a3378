use anyhow::{bail, ensure, Context};

use docsearch_core::error::{Error, Result};
use docsearch_core::traits::{ArtifactStore, Embedder};
use docsearch_core::types::Chunk;
use docsearch_text::{tokenize, LexicalIndex};
use docsearch_vector::{DenseIndex, EmbeddingMatrix};

use crate::corpus::CorpusState;
use crate::persist::{read_manifest, ArtifactRef};

/// Hydrates the corpus the manifest points at, or `None`.
///
/// Any inconsistency (missing or corrupt artifact, count mismatch, or vectors
/// from a model other than `embedder`) yields `None` and a warning; a corpus
/// is never partially loaded.
pub fn load_corpus(store: &dyn ArtifactStore, embedder: &dyn Embedder) -> Option<CorpusState> {
    match try_load(store, embedder) {
        Ok(Some(state)) => {
            tracing::info!(generation = state.generation(), chunks = state.len(), "loaded persisted corpus");
            Some(state)
        }
        Ok(None) => {
            tracing::info!("no persisted corpus");
            None
        }
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "persisted corpus rejected, starting empty");
            None
        }
    }
}

fn try_load(store: &dyn ArtifactStore, embedder: &dyn Embedder) -> anyhow::Result<Option<CorpusState>> {
    let Some(manifest) = read_manifest(store)? else {
        return Ok(None);
    };
    // Same width does not mean same vector space.
    ensure!(
        manifest.embedder_id == embedder.embedder_id(),
        "corpus was embedded with '{}', active embedder is '{}'",
        manifest.embedder_id,
        embedder.embedder_id()
    );
    let expected_dim = embedder.dim();
    ensure!(
        manifest.dim == expected_dim,
        "persisted dimension {} does not match embedder dimension {expected_dim}",
        manifest.dim
    );
    ensure!(manifest.chunk_count > 0, "manifest describes an empty corpus");

    let dense_bytes = fetch(store, &manifest.artifacts.dense)?;
    let dense = DenseIndex::from_bytes(&dense_bytes).context("decode dense index")?;
    ensure!(dense.dim() == expected_dim, "dense index has dimension {}", dense.dim());

    let chunk_bytes = fetch(store, &manifest.artifacts.chunks)?;
    let chunks: Vec<Chunk> = serde_json::from_slice(&chunk_bytes).context("parse chunk list")?;
    if chunks.len() != manifest.chunk_count || dense.len() != manifest.chunk_count {
        bail!(
            "count mismatch: manifest {}, chunks {}, vectors {}",
            manifest.chunk_count,
            chunks.len(),
            dense.len()
        );
    }

    // Always rebuilt from chunk text so tokenization matches the running code.
    let tokenized: Vec<Vec<String>> = chunks.iter().map(|c| tokenize(&c.text)).collect();
    let lexical = LexicalIndex::build_tokenized(&tokenized)?;
    let state = CorpusState::new(chunks, dense, lexical, manifest.generation, manifest.embedder_id)?;
    Ok(Some(state))
}

/// Reads the active generation's embedding matrix, verified against the manifest.
pub fn load_embeddings(store: &dyn ArtifactStore) -> Result<Option<EmbeddingMatrix>> {
    let Some(manifest) = read_manifest(store)? else {
        return Ok(None);
    };
    let reference = &manifest.artifacts.embeddings;
    let bytes = fetch(store, reference).map_err(|e| Error::persistence(&reference.key, format!("{e:#}")))?;
    let matrix = EmbeddingMatrix::from_bytes(&bytes).map_err(|e| Error::persistence(&reference.key, format!("{e:#}")))?;
    Ok(Some(matrix))
}

fn fetch(store: &dyn ArtifactStore, reference: &ArtifactRef) -> anyhow::Result<Vec<u8>> {
    let bytes = store
        .get(&reference.key)?
        .with_context(|| format!("artifact '{}' is missing", reference.key))?;
    ensure!(reference.matches(&bytes), "artifact '{}' failed its checksum", reference.key);
    Ok(bytes)
}
