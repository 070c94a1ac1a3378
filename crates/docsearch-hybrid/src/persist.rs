//! Persisted layout: generation-numbered artifacts plus a manifest that names
//! the active generation.
//!
//! Writing `manifest.json` is the commit point of a build. Artifacts of a
//! generation are never rewritten once a manifest points at them, so a failed
//! build cannot damage the corpus the current manifest describes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docsearch_core::error::{Error, Result};
use docsearch_core::traits::ArtifactStore;

pub const MANIFEST_KEY: &str = "manifest.json";
pub const MANIFEST_VERSION: u32 = 1;

pub fn dense_key(generation: u64) -> String {
    format!("dense-{generation}.idx")
}

pub fn embeddings_key(generation: u64) -> String {
    format!("embeddings-{generation}.bin")
}

pub fn chunks_key(generation: u64) -> String {
    format!("chunks-{generation}.json")
}

pub fn checksum(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub key: String,
    pub checksum: String,
    pub size: u64,
}

impl ArtifactRef {
    pub fn for_bytes(key: String, bytes: &[u8]) -> Self {
        Self { key, checksum: checksum(bytes), size: bytes.len() as u64 }
    }

    pub fn matches(&self, bytes: &[u8]) -> bool {
        self.size == bytes.len() as u64 && self.checksum == checksum(bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSet {
    pub dense: ArtifactRef,
    pub embeddings: ArtifactRef,
    pub chunks: ArtifactRef,
}

impl ArtifactSet {
    pub fn keys(&self) -> [&str; 3] {
        [&self.dense.key, &self.embeddings.key, &self.chunks.key]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub format_version: u32,
    pub generation: u64,
    pub dim: usize,
    pub chunk_count: usize,
    pub embedder_id: String,
    pub built_at: DateTime<Utc>,
    pub artifacts: ArtifactSet,
}

/// `Ok(None)` when no manifest has been committed yet.
pub fn read_manifest(store: &dyn ArtifactStore) -> Result<Option<Manifest>> {
    let Some(bytes) = store.get(MANIFEST_KEY)? else {
        return Ok(None);
    };
    let manifest: Manifest =
        serde_json::from_slice(&bytes).map_err(|e| Error::persistence(MANIFEST_KEY, e))?;
    check_version(&manifest)?;
    Ok(Some(manifest))
}

fn check_version(manifest: &Manifest) -> Result<()> {
    if manifest.format_version != MANIFEST_VERSION {
        return Err(Error::persistence(
            MANIFEST_KEY,
            format!("unsupported manifest version {}", manifest.format_version),
        ));
    }
    Ok(())
}

/// Generation the next build writes, plus the manifest it supersedes.
///
/// Store read failures and manifests of another format version are errors:
/// the build must not guess and risk writing over committed artifacts. A
/// manifest that does not parse at all gets the first generation none of
/// whose artifact keys exist yet.
pub fn plan_generation(store: &dyn ArtifactStore) -> Result<(u64, Option<Manifest>)> {
    let Some(bytes) = store.get(MANIFEST_KEY)? else {
        return Ok((1, None));
    };
    match serde_json::from_slice::<Manifest>(&bytes) {
        Ok(manifest) => {
            check_version(&manifest)?;
            Ok((manifest.generation + 1, Some(manifest)))
        }
        Err(e) => {
            tracing::warn!(error = %e, "manifest unreadable, choosing an unused generation");
            Ok((unused_generation(store)?, None))
        }
    }
}

fn unused_generation(store: &dyn ArtifactStore) -> Result<u64> {
    let mut generation = 1;
    loop {
        let mut taken = false;
        for key in [dense_key(generation), embeddings_key(generation), chunks_key(generation)] {
            if store.get(&key)?.is_some() {
                taken = true;
                break;
            }
        }
        if !taken {
            return Ok(generation);
        }
        generation += 1;
    }
}

pub fn write_manifest(store: &dyn ArtifactStore, manifest: &Manifest) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(manifest).map_err(|e| Error::persistence(MANIFEST_KEY, e))?;
    store.put(MANIFEST_KEY, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_carry_generation() {
        assert_eq!(dense_key(3), "dense-3.idx");
        assert_eq!(embeddings_key(3), "embeddings-3.bin");
        assert_eq!(chunks_key(12), "chunks-12.json");
    }

    #[test]
    fn artifact_ref_detects_changes() {
        let r = ArtifactRef::for_bytes("a".into(), b"hello");
        assert!(r.matches(b"hello"));
        assert!(!r.matches(b"hellp"));
        assert!(!r.matches(b"hello!"));
    }
}
