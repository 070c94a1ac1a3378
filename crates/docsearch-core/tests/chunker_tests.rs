use docsearch_core::chunker::{chunk_pages, split_paragraphs, ChunkingConfig};
use docsearch_core::types::{Chunk, Page};

fn page(number: u32, text: &str) -> Page {
    Page { source_name: "manual.txt".to_string(), page_number: number, text: text.to_string() }
}

fn cfg(chunk_size: usize, overlap: usize) -> ChunkingConfig {
    ChunkingConfig { chunk_size, overlap }
}

/// Drops the overlap prefix each chunk repeats from its predecessor on the
/// same page and returns the remaining words per page.
fn reconstruct(chunks: &[Chunk], overlap: usize) -> Vec<(u32, Vec<String>)> {
    let mut pages: Vec<(u32, Vec<String>)> = Vec::new();
    let mut prev_len = 0usize;
    for c in chunks {
        let words: Vec<String> = c.text.split(' ').map(str::to_string).collect();
        match pages.last_mut() {
            Some((n, acc)) if *n == c.page_number => {
                let skip = overlap.min(prev_len);
                acc.extend(words.iter().skip(skip).cloned());
            }
            _ => pages.push((c.page_number, words.clone())),
        }
        prev_len = words.len();
    }
    pages
}

#[test]
fn two_paragraphs_flush_with_overlap() {
    let pages = vec![page(1, "AAAA BBBB.\n\nCCCC DDDD.")];
    let chunks = chunk_pages(&pages, &cfg(2, 1));
    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["AAAA BBBB.", "BBBB. CCCC DDDD."]);
    assert!(chunks.iter().all(|c| c.page_number == 1));
}

#[test]
fn oversized_paragraph_is_kept_whole() {
    // A paragraph longer than chunk_size is not split mid-paragraph; the
    // window is allowed to exceed chunk_size.
    let pages = vec![page(1, "AAAA BBBB. CCCC DDDD.")];
    let chunks = chunk_pages(&pages, &cfg(2, 1));
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, "AAAA BBBB. CCCC DDDD.");
}

#[test]
fn overlap_can_repeat_a_short_paragraph_verbatim() {
    let pages = vec![page(1, "one two\n\nthree four five\n\nsix")];
    let chunks = chunk_pages(&pages, &cfg(4, 3));
    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["one two", "one two three four five", "three four five six"]);
}

#[test]
fn chunks_never_span_pages_and_follow_page_order() {
    let pages = vec![page(1, "alpha beta gamma"), page(3, "delta\n\nepsilon zeta")];
    let chunks = chunk_pages(&pages, &cfg(200, 40));
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].page_number, 1);
    assert_eq!(chunks[0].text, "alpha beta gamma");
    assert_eq!(chunks[1].page_number, 3);
    assert_eq!(chunks[1].text, "delta epsilon zeta");
    assert!(chunks.iter().all(|c| c.source_name == "manual.txt"));
}

#[test]
fn at_least_one_chunk_per_non_empty_page() {
    let pages: Vec<Page> = (1..=7).map(|n| page(n, &"word ".repeat(n as usize * 13))).collect();
    for (size, overlap) in [(5, 0), (10, 3), (200, 40)] {
        let chunks = chunk_pages(&pages, &cfg(size, overlap));
        assert!(chunks.len() >= pages.len());
        for p in &pages {
            assert!(chunks.iter().any(|c| c.page_number == p.page_number), "page {} has no chunk", p.page_number);
        }
    }
}

#[test]
fn dropping_overlap_reconstructs_original_words() {
    let text = (0..60)
        .map(|i| {
            let words: Vec<String> = (0..(i % 7 + 1)).map(|j| format!("w{i}_{j}")).collect();
            words.join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    let pages = vec![page(1, &text), page(2, "tail words only\n   \nand more")];
    for (size, overlap) in [(4, 1), (8, 3), (20, 5), (3, 0)] {
        let chunks = chunk_pages(&pages, &cfg(size, overlap));
        let rebuilt = reconstruct(&chunks, overlap);
        assert_eq!(rebuilt.len(), pages.len());
        for ((n, words), p) in rebuilt.iter().zip(&pages) {
            let original: Vec<String> = p.text.split_whitespace().map(str::to_string).collect();
            assert_eq!(*n, p.page_number);
            assert_eq!(words, &original, "size={size} overlap={overlap}");
        }
    }
}

#[test]
fn zero_overlap_starts_fresh_windows() {
    let pages = vec![page(1, "a b\n\nc d\n\ne f")];
    let chunks = chunk_pages(&pages, &cfg(2, 0));
    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["a b", "c d", "e f"]);
}

#[test]
fn paragraphs_split_on_whitespace_only_lines() {
    let text = "first line\nstill first\n \t \nsecond\r\n\r\n\r\nthird";
    let paragraphs = split_paragraphs(text);
    assert_eq!(paragraphs.len(), 3);
    assert!(paragraphs[0].starts_with("first line"));
    assert!(paragraphs[0].contains("still first"));
    assert_eq!(paragraphs[1].trim(), "second");
    assert_eq!(paragraphs[2], "third");
}

#[test]
fn default_window_is_200_words_with_40_overlap() {
    let c = ChunkingConfig::default();
    assert_eq!((c.chunk_size, c.overlap), (200, 40));
}
