#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use docsearch_core::config::Settings;
use docsearch_core::error::{Error, Result};
use docsearch_core::store::InMemoryArtifactStore;
use docsearch_core::traits::{ArtifactStore, Embedder, Reranker};
use docsearch_core::types::Page;
use docsearch_embed::{FakeEmbedder, FakeReranker};
use docsearch_hybrid::SearchService;

pub fn page(page_number: u32, text: &str) -> Page {
    Page { source_name: "manual.pdf".to_string(), page_number, text: text.to_string() }
}

/// Four chunks with `chunk_size = 8, overlap = 2`:
/// 0: rainwater paragraph (page 1), 1: overlap + solar paragraph (page 1),
/// 2: sourdough (page 2), 3: wood stove (page 3).
pub fn homestead_pages() -> Vec<Page> {
    vec![
        page(
            1,
            "rainwater barrel overflow valve keeps the cistern clean\n\nsolar panel wiring needs fused connectors",
        ),
        page(2, "sourdough starter feeding schedule for cold kitchens"),
        page(3, "wood stove chimney cleaning before winter"),
    ]
}

pub fn garden_pages() -> Vec<Page> {
    vec![
        page(1, "raised bed soil mix with compost and solar panel shade notes"),
        page(2, "drip irrigation timer and rainwater barrel hookup"),
    ]
}

pub fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.chunking.chunk_size = 8;
    settings.chunking.overlap = 2;
    settings.models.use_fake = true;
    settings
}

pub fn fake_service(store: Box<dyn ArtifactStore>) -> SearchService {
    SearchService::open(settings(), Box::new(FakeEmbedder::new(128)), Box::new(FakeReranker::new()), store)
        .expect("open service")
}

/// Records every batch it is asked to score.
#[derive(Clone, Default)]
pub struct CountingReranker {
    pub calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl Reranker for CountingReranker {
    fn rerank(&self, query: &str, texts: &[String]) -> anyhow::Result<Vec<f32>> {
        self.calls.lock().unwrap().push(texts.to_vec());
        FakeReranker::new().rerank(query, texts)
    }
}

pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embedder_id(&self) -> &str {
        "failing"
    }

    fn dim(&self) -> usize {
        128
    }

    fn embed_batch(&self, _texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        anyhow::bail!("accelerator went away")
    }
}

/// Fake embedder with its own id: same width, different vector space.
pub struct RenamedEmbedder {
    inner: FakeEmbedder,
    id: String,
}

impl RenamedEmbedder {
    pub fn new(dim: usize, id: &str) -> Self {
        Self { inner: FakeEmbedder::new(dim), id: id.to_string() }
    }
}

impl Embedder for RenamedEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.inner.dim()
    }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.inner.embed_batch(texts)
    }
}

/// `FakeEmbedder::new(128)` that, once armed, serves a fixed number of
/// batches and then fails.
#[derive(Clone, Default)]
pub struct BatchFailingEmbedder {
    batches_left: Arc<Mutex<Option<usize>>>,
}

impl BatchFailingEmbedder {
    pub fn fail_after_batches(&self, batches: usize) {
        *self.batches_left.lock().unwrap() = Some(batches);
    }
}

impl Embedder for BatchFailingEmbedder {
    fn embedder_id(&self) -> &str {
        "fake-xxh64:d128"
    }

    fn dim(&self) -> usize {
        128
    }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        if let Some(left) = self.batches_left.lock().unwrap().as_mut() {
            if *left == 0 {
                anyhow::bail!("accelerator went away mid-build");
            }
            *left -= 1;
        }
        FakeEmbedder::new(128).embed_batch(texts)
    }
}

/// In-memory store whose `put` fails for keys starting with an armed prefix
/// and whose `get` fails for one armed key.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemoryArtifactStore,
    fail_prefix: Mutex<Option<String>>,
    fail_get: Mutex<Option<String>>,
}

impl FlakyStore {
    pub fn fail_puts_starting_with(&self, prefix: &str) {
        *self.fail_prefix.lock().unwrap() = Some(prefix.to_string());
    }

    pub fn fail_gets_of(&self, key: &str) {
        *self.fail_get.lock().unwrap() = Some(key.to_string());
    }

    pub fn heal(&self) {
        *self.fail_prefix.lock().unwrap() = None;
        *self.fail_get.lock().unwrap() = None;
    }
}

impl ArtifactStore for FlakyStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        if let Some(prefix) = self.fail_prefix.lock().unwrap().as_deref() {
            if key.starts_with(prefix) {
                return Err(Error::persistence(key, "disk full"));
            }
        }
        self.inner.put(key, bytes)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if self.fail_get.lock().unwrap().as_deref() == Some(key) {
            return Err(Error::persistence(key, "input/output error"));
        }
        self.inner.get(key)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.inner.delete(key)
    }
}
