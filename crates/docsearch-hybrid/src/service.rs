use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use docsearch_core::config::Settings;
use docsearch_core::data_processor::DataProcessor;
use docsearch_core::error::{Error, Result};
use docsearch_core::traits::{ArtifactStore, Embedder, Reranker};
use docsearch_core::types::{Page, RankedChunk};
use docsearch_vector::EmbeddingMatrix;

use crate::builder::IndexBuilder;
use crate::corpus::{CorpusHandle, CorpusSummary};
use crate::loader::{load_corpus, load_embeddings};
use crate::retrieval;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub chunk_count: usize,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub score: f32,
    pub text: String,
    pub page: u32,
}

impl From<RankedChunk> for SearchResult {
    fn from(r: RankedChunk) -> Self {
        Self { score: r.score, text: r.chunk.text, page: r.chunk.page_number }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub latency_seconds: f64,
    pub results: Vec<SearchResult>,
}

/// Build and search over the single active corpus.
///
/// Safe to share across threads: searches run against a snapshot of the live
/// corpus, and builds are serialized so only one writes artifacts at a time.
pub struct SearchService {
    settings: Settings,
    processor: DataProcessor,
    embedder: Box<dyn Embedder>,
    reranker: Box<dyn Reranker>,
    store: Box<dyn ArtifactStore>,
    corpus: CorpusHandle,
    build_lock: Mutex<()>,
    show_progress: bool,
}

impl SearchService {
    /// Validates settings and hydrates the persisted corpus, if any.
    pub fn open(
        settings: Settings,
        embedder: Box<dyn Embedder>,
        reranker: Box<dyn Reranker>,
        store: Box<dyn ArtifactStore>,
    ) -> Result<Self> {
        settings.validate()?;
        let initial = load_corpus(store.as_ref(), embedder.as_ref());
        Ok(Self {
            processor: DataProcessor::new(settings.chunking),
            settings,
            embedder,
            reranker,
            store,
            corpus: CorpusHandle::new(initial),
            build_lock: Mutex::new(()),
            show_progress: false,
        })
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replaces the active corpus with one built from `pages`. On failure the
    /// previous corpus stays live and persisted.
    pub fn build(&self, pages: &[Page]) -> Result<BuildReport> {
        let _guard = self.build_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let started = Instant::now();
        let state = IndexBuilder::new(self.embedder.as_ref(), self.store.as_ref(), *self.processor.chunking_config())
            .batch_size(self.settings.embedding.batch_size)
            .show_progress(self.show_progress)
            .build_corpus(pages)?;
        let report = BuildReport { chunk_count: state.len(), generation: state.generation() };
        self.corpus.replace(state);
        tracing::info!(
            chunks = report.chunk_count,
            generation = report.generation,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "corpus built"
        );
        Ok(report)
    }

    pub fn build_from_file(&self, path: &Path) -> Result<BuildReport> {
        let pages = self.processor.extract_pages(path)?;
        self.build(&pages)
    }

    /// Top `top_k` (default `retrieval.top_k`) reranked chunks for `query`.
    pub fn search(&self, query: &str, top_k: Option<usize>) -> Result<SearchResponse> {
        let started = Instant::now();
        let results = self.search_ranked(query, top_k)?.into_iter().map(SearchResult::from).collect();
        Ok(SearchResponse { latency_seconds: started.elapsed().as_secs_f64(), results })
    }

    pub fn search_ranked(&self, query: &str, top_k: Option<usize>) -> Result<Vec<RankedChunk>> {
        let state = self.corpus.snapshot().ok_or(Error::NotIndexed)?;
        let top_k = top_k.unwrap_or(self.settings.retrieval.top_k);
        let ranked = retrieval::search(
            &state,
            self.embedder.as_ref(),
            self.reranker.as_ref(),
            query,
            top_k,
            self.settings.retrieval.candidate_k,
        )?;
        tracing::info!(results = ranked.len(), generation = state.generation(), "search finished");
        Ok(ranked)
    }

    pub fn status(&self) -> Option<CorpusSummary> {
        self.corpus.snapshot().map(|s| s.summary())
    }

    /// The persisted embedding matrix of the active generation.
    pub fn load_embeddings(&self) -> Result<Option<EmbeddingMatrix>> {
        load_embeddings(self.store.as_ref())
    }
}
