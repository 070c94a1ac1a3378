//! Query path: dense and lexical candidates, fused and reranked.

use std::collections::BTreeSet;

use docsearch_core::error::{Error, Result};
use docsearch_core::traits::{Embedder, Reranker};
use docsearch_core::types::{ChunkIndex, RankedChunk, SearchHit};
use docsearch_text::tokenize;

use crate::corpus::CorpusState;

pub fn search(
    state: &CorpusState,
    embedder: &dyn Embedder,
    reranker: &dyn Reranker,
    query: &str,
    top_k: usize,
    candidate_k: usize,
) -> Result<Vec<RankedChunk>> {
    if query.trim().is_empty() {
        return Err(Error::Input("query must not be blank".to_string()));
    }
    if top_k == 0 || candidate_k == 0 {
        return Err(Error::Input("top_k and candidate_k must be at least 1".to_string()));
    }
    if state.is_empty() {
        return Err(Error::NotIndexed);
    }

    let query_vector = embed_query(embedder, query, state.dense().dim())?;
    let dense_hits = state.dense().search_hits(&query_vector, candidate_k).map_err(Error::operation)?;
    let lexical_hits = state.lexical().top_k(&tokenize(query), candidate_k).map_err(Error::operation)?;
    let candidates = fuse_candidates(&dense_hits, &lexical_hits);
    tracing::debug!(
        dense = dense_hits.len(),
        lexical = lexical_hits.len(),
        fused = candidates.len(),
        "collected candidates"
    );

    let texts: Vec<String> = candidates
        .iter()
        .map(|&i| state.chunk(i).map(|c| c.text.clone()).ok_or_else(|| missing_chunk(i)))
        .collect::<Result<_>>()?;
    let scores = reranker.rerank(query, &texts).map_err(Error::inference)?;
    if scores.len() != candidates.len() {
        return Err(Error::Inference(format!(
            "reranker returned {} scores for {} candidates",
            scores.len(),
            candidates.len()
        )));
    }
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(Error::Inference("reranker returned a non-finite score".to_string()));
    }

    let mut ranked: Vec<(ChunkIndex, f32)> = candidates.into_iter().zip(scores).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(top_k);
    ranked
        .into_iter()
        .map(|(chunk_index, score)| {
            let chunk = state.chunk(chunk_index).cloned().ok_or_else(|| missing_chunk(chunk_index))?;
            Ok(RankedChunk { chunk_index, score, chunk })
        })
        .collect()
}

/// Deduplicated union of both candidate lists, in ascending chunk order.
pub fn fuse_candidates(dense: &[SearchHit], lexical: &[SearchHit]) -> Vec<ChunkIndex> {
    dense
        .iter()
        .chain(lexical)
        .map(|h| h.chunk_index)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn embed_query(embedder: &dyn Embedder, query: &str, dim: usize) -> Result<Vec<f32>> {
    let mut vectors = embedder.embed_batch(&[query.to_string()]).map_err(Error::inference)?;
    let vector = vectors
        .pop()
        .filter(|_| vectors.is_empty())
        .ok_or_else(|| Error::Inference("embedder did not return exactly one query vector".to_string()))?;
    if vector.len() != dim {
        return Err(Error::Inference(format!("query vector has dimension {}, corpus expects {dim}", vector.len())));
    }
    Ok(vector)
}

fn missing_chunk(index: ChunkIndex) -> Error {
    Error::Operation(format!("candidate {index} is outside the corpus"))
}
