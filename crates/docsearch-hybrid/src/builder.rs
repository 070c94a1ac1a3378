use indicatif::{ProgressBar, ProgressStyle};

use docsearch_core::chunker::{chunk_pages, ChunkingConfig};
use docsearch_core::error::{Error, Result};
use docsearch_core::traits::{ArtifactStore, Embedder};
use docsearch_core::types::{Chunk, Page};
use docsearch_text::{tokenize, LexicalIndex};
use docsearch_vector::{DenseIndex, EmbeddingMatrix};

use crate::corpus::CorpusState;
use crate::persist::{
    chunks_key, dense_key, embeddings_key, plan_generation, write_manifest, ArtifactRef, ArtifactSet, Manifest,
    MANIFEST_VERSION,
};

/// Chunks, embeds, indexes and persists one document set.
///
/// Everything is computed in memory first; artifacts are written only once
/// both indexes exist, and the build commits by writing the manifest.
pub struct IndexBuilder<'a> {
    embedder: &'a dyn Embedder,
    store: &'a dyn ArtifactStore,
    chunking: ChunkingConfig,
    batch_size: usize,
    show_progress: bool,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(embedder: &'a dyn Embedder, store: &'a dyn ArtifactStore, chunking: ChunkingConfig) -> Self {
        Self { embedder, store, chunking, batch_size: 32, show_progress: false }
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn build_corpus(&self, pages: &[Page]) -> Result<CorpusState> {
        let chunks = chunk_pages(pages, &self.chunking);
        if chunks.is_empty() {
            return Err(Error::Input("document produced no chunks".to_string()));
        }
        tracing::info!(pages = pages.len(), chunks = chunks.len(), "chunked document");

        let dim = self.embedder.dim();
        let vectors = self.embed_chunks(&chunks)?;
        let dense = DenseIndex::build(dim, &vectors).map_err(Error::inference)?;
        let tokenized: Vec<Vec<String>> = chunks.iter().map(|c| tokenize(&c.text)).collect();
        let lexical = LexicalIndex::build_tokenized(&tokenized).map_err(Error::operation)?;

        let (generation, previous) = plan_generation(self.store)?;
        let staged = encode_artifacts(generation, &dense, &vectors, &chunks)?;
        let mut written: Vec<&str> = Vec::with_capacity(staged.len());
        for (key, bytes) in &staged {
            written.push(key);
            if let Err(e) = self.store.put(key, bytes) {
                self.discard(&written);
                return Err(e);
            }
        }

        let [(dense_k, dense_b), (emb_k, emb_b), (chunks_k, chunks_b)] = &staged;
        let manifest = Manifest {
            format_version: MANIFEST_VERSION,
            generation,
            dim,
            chunk_count: chunks.len(),
            embedder_id: self.embedder.embedder_id().to_string(),
            built_at: chrono::Utc::now(),
            artifacts: ArtifactSet {
                dense: ArtifactRef::for_bytes(dense_k.clone(), dense_b),
                embeddings: ArtifactRef::for_bytes(emb_k.clone(), emb_b),
                chunks: ArtifactRef::for_bytes(chunks_k.clone(), chunks_b),
            },
        };
        if let Err(e) = write_manifest(self.store, &manifest) {
            self.discard(&written);
            return Err(e);
        }
        tracing::info!(generation, chunks = chunks.len(), dim, "corpus committed");

        if let Some(prev) = previous {
            self.discard(&prev.artifacts.keys());
        }

        CorpusState::new(chunks, dense, lexical, generation, self.embedder.embedder_id()).map_err(Error::operation)
    }

    fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let pb = self.progress_bar(texts.len() as u64);
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let embedded = self.embedder.embed_batch(batch).map_err(Error::inference)?;
            if embedded.len() != batch.len() {
                return Err(Error::Inference(format!(
                    "embedder returned {} vectors for {} texts",
                    embedded.len(),
                    batch.len()
                )));
            }
            if let Some(bad) = embedded.iter().find(|v| v.len() != self.embedder.dim()) {
                return Err(Error::Inference(format!(
                    "embedder returned dimension {}, expected {}",
                    bad.len(),
                    self.embedder.dim()
                )));
            }
            vectors.extend(embedded);
            pb.inc(batch.len() as u64);
        }
        pb.finish_and_clear();
        Ok(vectors)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("embedding");
        pb
    }

    /// Best-effort removal; leftovers are unreferenced and harmless.
    fn discard(&self, keys: &[&str]) {
        for key in keys {
            if let Err(e) = self.store.delete(key) {
                tracing::warn!(key, error = %e, "failed to remove artifact");
            }
        }
    }
}

/// Serialized `(key, bytes)` for the dense index, embedding matrix and chunk
/// list of one generation. Failures are persistence errors on that key.
fn encode_artifacts(
    generation: u64,
    dense: &DenseIndex,
    vectors: &[Vec<f32>],
    chunks: &[Chunk],
) -> Result<[(String, Vec<u8>); 3]> {
    let (dense_k, emb_k, chunks_k) = (dense_key(generation), embeddings_key(generation), chunks_key(generation));
    let dense_bytes = dense.to_bytes().map_err(|e| Error::persistence(&dense_k, format!("{e:#}")))?;
    let matrix_bytes = EmbeddingMatrix::from_rows(dense.dim(), vectors)
        .and_then(|m| m.to_bytes())
        .map_err(|e| Error::persistence(&emb_k, format!("{e:#}")))?;
    let chunk_bytes = serde_json::to_vec(chunks).map_err(|e| Error::persistence(&chunks_k, e))?;
    Ok([(dense_k, dense_bytes), (emb_k, matrix_bytes), (chunks_k, chunk_bytes)])
}
