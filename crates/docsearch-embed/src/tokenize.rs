use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use tokenizers::{Encoding, Tokenizer, TruncationParams};

/// XLM-RoBERTa `<pad>` id, used when the tokenizer does not name one.
pub const DEFAULT_PAD_ID: u32 = 1;

pub fn load_tokenizer(path: &std::path::Path, max_len: usize) -> Result<Tokenizer> {
    let mut tokenizer = Tokenizer::from_file(path)
        .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", path.display(), e))?;
    tokenizer
        .with_truncation(Some(TruncationParams { max_length: max_len, ..Default::default() }))
        .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;
    tokenizer.with_padding(None);
    Ok(tokenizer)
}

pub fn pad_id(tokenizer: &Tokenizer) -> u32 {
    tokenizer.token_to_id("<pad>").unwrap_or(DEFAULT_PAD_ID)
}

pub fn encode_texts(tokenizer: &Tokenizer, texts: &[String]) -> Result<Vec<Encoding>> {
    texts
        .iter()
        .map(|t| tokenizer.encode(t.as_str(), true).map_err(|e| anyhow!("Tokenization failed: {}", e)))
        .collect()
}

/// Encodes `(query, text)` pairs the way a cross-encoder expects them.
pub fn encode_pairs(tokenizer: &Tokenizer, query: &str, texts: &[String]) -> Result<Vec<Encoding>> {
    texts
        .iter()
        .map(|t| tokenizer.encode((query, t.as_str()), true).map_err(|e| anyhow!("Tokenization failed: {}", e)))
        .collect()
}

/// Right-pads rows of ids to the longest row. Returns flat ids, flat mask and
/// the padded width.
pub fn pad_rows(rows: &[&[u32]], pad_id: u32) -> (Vec<u32>, Vec<u32>, usize) {
    let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let mut ids = Vec::with_capacity(rows.len() * width);
    let mut mask = Vec::with_capacity(rows.len() * width);
    for row in rows {
        ids.extend_from_slice(row);
        mask.extend(std::iter::repeat(1u32).take(row.len()));
        let pad = width - row.len();
        ids.extend(std::iter::repeat(pad_id).take(pad));
        mask.extend(std::iter::repeat(0u32).take(pad));
    }
    (ids, mask, width)
}

/// `[B, T]` input ids and attention mask tensors for a batch of encodings.
pub fn batch_on_device(encodings: &[Encoding], pad_id: u32, device: &Device) -> Result<(Tensor, Tensor)> {
    let rows: Vec<&[u32]> = encodings.iter().map(Encoding::get_ids).collect();
    let (ids, mask, width) = pad_rows(&rows, pad_id);
    let batch = encodings.len();
    let input_ids = Tensor::from_vec(ids, (batch, width), device)?;
    let attention_mask = Tensor::from_vec(mask, (batch, width), device)?;
    Ok((input_ids, attention_mask))
}
