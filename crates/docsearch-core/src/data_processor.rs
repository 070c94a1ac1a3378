use std::fs;
use std::path::Path;

use crate::chunker::{chunk_pages, ChunkingConfig};
use crate::error::{Error, Result};
use crate::types::{Chunk, Page};

/// Page separator emitted by common PDF-to-text extractors.
pub const PAGE_BREAK: char = '\u{0c}';

const SUPPORTED_EXTENSIONS: &[&str] = &["txt"];

/// Turns an extracted document into pages and pages into chunks.
#[derive(Debug, Clone, Default)]
pub struct DataProcessor {
    chunking_config: ChunkingConfig,
}

impl DataProcessor {
    pub fn new(chunking_config: ChunkingConfig) -> Self {
        Self { chunking_config }
    }

    pub fn chunking_config(&self) -> &ChunkingConfig {
        &self.chunking_config
    }

    /// Reads a text document whose pages are separated by form feeds.
    ///
    /// Rejects unsupported extensions and documents without any non-empty page
    /// before anything is chunked.
    pub fn extract_pages(&self, file_path: &Path) -> Result<Vec<Page>> {
        let extension = file_path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
        if !extension.as_deref().is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext)) {
            return Err(Error::Input(format!(
                "unsupported document type: {} (expected one of: {})",
                file_path.display(),
                SUPPORTED_EXTENSIONS.join(", ")
            )));
        }
        let content = Self::read_file_content(file_path)?;
        let source_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.display().to_string());
        let pages = Self::pages_from_text(&source_name, &content);
        if pages.is_empty() {
            return Err(Error::Input(format!("{} contains no extractable text", file_path.display())));
        }
        tracing::info!(source = %source_name, pages = pages.len(), "extracted pages");
        Ok(pages)
    }

    /// Splits raw text on page breaks. Empty pages are dropped but keep their
    /// place in the numbering, so page numbers match the source document.
    pub fn pages_from_text(source_name: &str, content: &str) -> Vec<Page> {
        content
            .split(PAGE_BREAK)
            .enumerate()
            .filter_map(|(i, raw)| {
                let text = raw.trim();
                if text.is_empty() {
                    return None;
                }
                let page_number = u32::try_from(i + 1).ok()?;
                Some(Page { source_name: source_name.to_string(), page_number, text: text.to_string() })
            })
            .collect()
    }

    pub fn chunk_pages(&self, pages: &[Page]) -> Vec<Chunk> {
        chunk_pages(pages, &self.chunking_config)
    }

    fn read_file_content(file_path: &Path) -> Result<String> {
        match fs::read_to_string(file_path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                let bytes = fs::read(file_path)
                    .map_err(|e| Error::Input(format!("cannot read {}: {e}", file_path.display())))?;
                Ok(String::from_utf8_lossy(&bytes).to_string())
            }
            Err(e) => Err(Error::Input(format!("cannot read {}: {e}", file_path.display()))),
        }
    }
}
