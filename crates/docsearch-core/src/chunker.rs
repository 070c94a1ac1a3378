//! Paragraph-aware sliding-window chunking over word tokens.
//!
//! Each page is chunked independently, so a chunk never spans pages. Words of
//! whole paragraphs are accumulated into a window; when the next paragraph
//! would push the window past `chunk_size`, the window is flushed and the next
//! one is seeded with the last `overlap` words of the flushed window.
//!
//! A single paragraph longer than `chunk_size` is never split: it is added
//! whole and the window may exceed `chunk_size`.

use serde::{Deserialize, Serialize};

use crate::types::{Chunk, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target window size in words.
    pub chunk_size: usize,
    /// Words carried from a flushed window into the next one.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 200, overlap: 40 }
    }
}

/// Chunks pages in order; the output order defines each chunk's corpus index.
pub fn chunk_pages(pages: &[Page], config: &ChunkingConfig) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for page in pages {
        chunk_page(page, config, &mut chunks);
    }
    chunks
}

fn chunk_page(page: &Page, config: &ChunkingConfig, out: &mut Vec<Chunk>) {
    let mut window: Vec<&str> = Vec::new();
    for paragraph in split_paragraphs(&page.text) {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if window.len() + words.len() > config.chunk_size && !window.is_empty() {
            out.push(make_chunk(page, &window));
            let cut = window.len() - config.overlap.min(window.len());
            window.drain(..cut);
        }
        window.extend(words);
    }
    if !window.is_empty() {
        out.push(make_chunk(page, &window));
    }
}

fn make_chunk(page: &Page, words: &[&str]) -> Chunk {
    Chunk {
        source_name: page.source_name.clone(),
        page_number: page.page_number,
        text: words.join(" "),
    }
}

/// Splits on blank lines (lines that are empty or whitespace only). Runs of
/// blank lines count as a single boundary.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    let mut paragraphs = Vec::new();
    let mut start: Option<usize> = None;
    let mut end = 0usize;
    let mut offset = 0usize;
    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        if line.trim().is_empty() {
            if let Some(s) = start.take() {
                paragraphs.push(&text[s..end]);
            }
            continue;
        }
        if start.is_none() {
            start = Some(line_start);
        }
        end = offset;
    }
    if let Some(s) = start {
        paragraphs.push(&text[s..end]);
    }
    paragraphs
}
