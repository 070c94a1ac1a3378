//! Concrete scoring models behind the `Embedder` and `Reranker` traits.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use docsearch_core::config::{expand_path, Settings};
use docsearch_core::traits::{Embedder, Reranker};

pub mod cross_encoder;
pub mod device;
pub mod fake;
pub mod model;
pub mod pool;
pub mod tokenize;
pub mod weights;

pub use cross_encoder::CrossEncoderReranker;
pub use fake::{FakeEmbedder, FakeReranker};
pub use model::EmbeddingModel;
pub use pool::masked_mean_l2;

const EMBEDDER_DIRS: &[&str] = &["../models/bge-m3", "models/bge-m3"];
const RERANKER_DIRS: &[&str] = &["../models/bge-reranker-base", "models/bge-reranker-base"];

/// True when `APP_USE_FAKE_EMBEDDINGS` is `1`/`true` or `models.use_fake` is set.
pub fn use_fake_models(settings: &Settings) -> bool {
    let from_env = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    from_env || settings.models.use_fake
}

pub fn get_default_embedder(settings: &Settings) -> Result<Box<dyn Embedder>> {
    if use_fake_models(settings) {
        tracing::info!("using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::default()));
    }
    let dir = resolve_model_dir(settings.embedding.model_dir.as_deref(), &["APP_MODEL_DIR", "MODEL_DIR"], EMBEDDER_DIRS)?;
    Ok(Box::new(EmbeddingModel::load(&dir, settings.embedding.max_len, settings.embedding.batch_size)?))
}

pub fn get_default_reranker(settings: &Settings) -> Result<Box<dyn Reranker>> {
    if use_fake_models(settings) {
        tracing::info!("using FakeReranker");
        return Ok(Box::new(FakeReranker::new()));
    }
    let dir = resolve_model_dir(settings.reranker.model_dir.as_deref(), &["APP_RERANKER_DIR"], RERANKER_DIRS)?;
    Ok(Box::new(CrossEncoderReranker::load(&dir, settings.reranker.max_len, settings.embedding.batch_size)?))
}

/// First existing directory among: the configured path, the named env vars,
/// then the fallback locations.
pub fn resolve_model_dir(configured: Option<&str>, env_vars: &[&str], fallbacks: &[&str]) -> Result<PathBuf> {
    if let Some(dir) = configured {
        let p = expand_path(dir);
        if p.exists() {
            return Ok(p);
        }
        return Err(anyhow!("Configured model directory does not exist: {}", p.display()));
    }
    for var in env_vars {
        if let Ok(dir) = std::env::var(var) {
            let p = expand_path(&dir);
            if p.exists() {
                tracing::info!(var, dir = %p.display(), "using model dir from env");
                return Ok(p);
            }
        }
    }
    for dir in fallbacks {
        let p = Path::new(dir);
        if p.exists() {
            tracing::info!(dir = %p.display(), "using model dir");
            return Ok(p.to_path_buf());
        }
    }
    Err(anyhow!("Could not locate model directory (tried {})", fallbacks.join(", ")))
}
