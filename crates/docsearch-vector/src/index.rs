use anyhow::{bail, ensure, Result};

use docsearch_core::types::{SearchHit, SourceKind};

/// Index reported for result slots beyond the number of stored vectors.
pub const MISSING: i64 = -1;

/// One query result slot. `index` is a chunk index, or [`MISSING`] for padding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub score: f32,
    pub index: i64,
}

impl Neighbor {
    pub fn chunk_index(&self) -> Option<usize> {
        usize::try_from(self.index).ok()
    }
}

/// Exact (brute-force) inner-product index over row-major vectors.
///
/// Vectors are expected to be L2-normalized, which makes the inner product a
/// cosine similarity. Row `i` is chunk index `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseIndex {
    dim: usize,
    data: Vec<f32>,
}

impl DenseIndex {
    pub fn new(dim: usize) -> Result<Self> {
        ensure!(dim > 0, "dense index dimension must be positive");
        Ok(Self { dim, data: Vec::new() })
    }

    pub fn build(dim: usize, vectors: &[Vec<f32>]) -> Result<Self> {
        let mut index = Self::new(dim)?;
        index.data.reserve(dim * vectors.len());
        for v in vectors {
            index.add(v)?;
        }
        Ok(index)
    }

    pub(crate) fn from_raw(dim: usize, data: Vec<f32>) -> Result<Self> {
        ensure!(dim > 0, "dense index dimension must be positive");
        ensure!(data.len() % dim == 0, "{} values do not form rows of {dim}", data.len());
        ensure!(data.iter().all(|x| x.is_finite()), "dense index holds non-finite values");
        Ok(Self { dim, data })
    }

    pub fn add(&mut self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dim {
            bail!("vector has dimension {}, index expects {}", vector.len(), self.dim);
        }
        ensure!(vector.iter().all(|x| x.is_finite()), "vector holds non-finite values");
        self.data.extend_from_slice(vector);
        Ok(())
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn raw(&self) -> &[f32] {
        &self.data
    }

    /// Exactly `k` slots, highest inner product first (ties to the lower index),
    /// padded with `(-inf, MISSING)` when fewer than `k` vectors are stored.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if vector.len() != self.dim {
            bail!("query has dimension {}, index expects {}", vector.len(), self.dim);
        }
        let mut scored: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(i, row)| Neighbor { score: dot(row, vector), index: i as i64 })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));
        scored.truncate(k);
        scored.resize(k, Neighbor { score: f32::NEG_INFINITY, index: MISSING });
        Ok(scored)
    }

    /// [`query`](Self::query) with padding slots dropped.
    pub fn search_hits(&self, vector: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        Ok(self
            .query(vector, k)?
            .into_iter()
            .filter_map(|n| {
                n.chunk_index().map(|chunk_index| SearchHit { chunk_index, score: n.score, source: SourceKind::Vector })
            })
            .collect())
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_product_matches_hand_computation() {
        assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, -5.0, 6.0]), 12.0);
    }

    #[test]
    fn rejects_ragged_raw_data() {
        assert!(DenseIndex::from_raw(3, vec![0.0; 7]).is_err());
        assert!(DenseIndex::from_raw(0, vec![]).is_err());
        assert!(DenseIndex::from_raw(2, vec![0.0, f32::NAN]).is_err());
    }
}
