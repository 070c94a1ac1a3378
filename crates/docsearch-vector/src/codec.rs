//! Binary layout of the dense index and embedding matrix artifacts.
//!
//! Both are bincode blobs with a four-byte magic and a format version in front
//! of the payload. Decoding validates the header and the payload shape.

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::index::DenseIndex;

pub const FORMAT_VERSION: u32 = 1;
const DENSE_MAGIC: [u8; 4] = *b"DSDX";
const MATRIX_MAGIC: [u8; 4] = *b"DSEM";

#[derive(Serialize, Deserialize)]
struct Blob {
    magic: [u8; 4],
    version: u32,
    dim: u64,
    rows: u64,
    data: Vec<f32>,
}

impl Blob {
    fn encode(magic: [u8; 4], dim: usize, rows: usize, data: &[f32]) -> Result<Vec<u8>> {
        let blob = Blob { magic, version: FORMAT_VERSION, dim: dim as u64, rows: rows as u64, data: data.to_vec() };
        bincode::serialize(&blob).context("serialize vector blob")
    }

    fn decode(magic: [u8; 4], bytes: &[u8]) -> Result<(usize, usize, Vec<f32>)> {
        let blob: Blob = bincode::deserialize(bytes).context("deserialize vector blob")?;
        if blob.magic != magic {
            bail!("unexpected blob magic {:?}", blob.magic);
        }
        ensure!(blob.version == FORMAT_VERSION, "unsupported blob version {}", blob.version);
        let consumed = bincode::serialized_size(&blob).context("measure vector blob")?;
        ensure!(consumed == bytes.len() as u64, "trailing bytes after vector blob");
        let dim = usize::try_from(blob.dim).context("blob dimension")?;
        let rows = usize::try_from(blob.rows).context("blob row count")?;
        ensure!(
            dim.checked_mul(rows) == Some(blob.data.len()),
            "blob holds {} values, header says {rows} x {dim}",
            blob.data.len()
        );
        Ok((dim, rows, blob.data))
    }
}

impl DenseIndex {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Blob::encode(DENSE_MAGIC, self.dim(), self.len(), self.raw())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (dim, rows, data) = Blob::decode(DENSE_MAGIC, bytes)?;
        tracing::debug!(dim, rows, bytes = bytes.len(), "decoded dense index");
        DenseIndex::from_raw(dim, data)
    }
}

/// The stored chunk embeddings, one row per chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    dim: usize,
    rows: usize,
    data: Vec<f32>,
}

impl EmbeddingMatrix {
    pub fn from_rows(dim: usize, rows: &[Vec<f32>]) -> Result<Self> {
        ensure!(dim > 0, "embedding dimension must be positive");
        let mut data = Vec::with_capacity(dim * rows.len());
        for (i, row) in rows.iter().enumerate() {
            ensure!(row.len() == dim, "embedding {i} has dimension {}, expected {dim}", row.len());
            data.extend_from_slice(row);
        }
        Ok(Self { dim, rows: rows.len(), data })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn row(&self, i: usize) -> Option<&[f32]> {
        self.data.chunks_exact(self.dim).nth(i)
    }

    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        self.data.chunks_exact(self.dim).map(<[f32]>::to_vec).collect()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Blob::encode(MATRIX_MAGIC, self.dim, self.rows, &self.data)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (dim, rows, data) = Blob::decode(MATRIX_MAGIC, bytes)?;
        ensure!(dim > 0, "embedding dimension must be positive");
        Ok(Self { dim, rows, data })
    }
}
