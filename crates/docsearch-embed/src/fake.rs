//! Deterministic stand-ins for the real models. No model files needed.

use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use anyhow::Result;
use twox_hash::XxHash64;

use docsearch_core::traits::{Embedder, Reranker};

pub const FAKE_DIM: usize = 1024;

/// Hashes each lowercase token into one of `dim` buckets, then L2-normalizes.
/// Texts sharing tokens get a positive inner product.
pub struct FakeEmbedder {
    dim: usize,
    id: String,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        let dim = dim.max(1);
        Self { dim, id: format!("fake-xxh64:d{dim}") }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.to_lowercase().split_whitespace().enumerate() {
            let h = hash_token(token);
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

impl Default for FakeEmbedder {
    fn default() -> Self {
        Self::new(FAKE_DIM)
    }
}

impl Embedder for FakeEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

/// Scores a pair by the fraction of distinct query tokens present in the text.
#[derive(Default)]
pub struct FakeReranker;

impl FakeReranker {
    pub fn new() -> Self {
        Self
    }

    pub fn score(query: &str, text: &str) -> f32 {
        let query_lower = query.to_lowercase();
        let query_tokens: HashSet<&str> = query_lower.split_whitespace().collect();
        if query_tokens.is_empty() {
            return 0.0;
        }
        let text_lower = text.to_lowercase();
        let text_tokens: HashSet<&str> = text_lower.split_whitespace().collect();
        let hits = query_tokens.iter().filter(|t| text_tokens.contains(*t)).count();
        hits as f32 / query_tokens.len() as f32
    }
}

impl Reranker for FakeReranker {
    fn rerank(&self, query: &str, texts: &[String]) -> Result<Vec<f32>> {
        Ok(texts.iter().map(|t| Self::score(query, t)).collect())
    }
}

fn hash_token(token: &str) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    token.hash(&mut hasher);
    hasher.finish()
}
