use std::path::Path;

use anyhow::{ensure, Result};
use candle_core::{Device, D};
use candle_transformers::models::xlm_roberta::XLMRobertaForSequenceClassification;
use tokenizers::Tokenizer;

use docsearch_core::traits::Reranker;

use crate::device::select_device;
use crate::tokenize::{batch_on_device, encode_pairs, load_tokenizer, pad_id};
use crate::weights::ModelFiles;

/// XLM-RoBERTa cross-encoder with a single relevance logit
/// (bge-reranker family). Scores are `sigmoid(logit)` in `(0, 1)`.
pub struct CrossEncoderReranker {
    model: XLMRobertaForSequenceClassification,
    tokenizer: Tokenizer,
    device: Device,
    pad_id: u32,
    batch_size: usize,
}

impl CrossEncoderReranker {
    pub fn load(model_dir: &Path, max_len: usize, batch_size: usize) -> Result<Self> {
        let device = select_device();
        tracing::info!(dir = %model_dir.display(), "loading reranker model");
        let files = ModelFiles::locate(model_dir)?;
        let tokenizer = load_tokenizer(&files.tokenizer, max_len)?;
        let config = files.read_config()?;
        let vb = files.var_builder(&device)?;
        let model = XLMRobertaForSequenceClassification::new(1, &config, vb)?;
        Ok(Self { model, pad_id: pad_id(&tokenizer), tokenizer, device, batch_size: batch_size.max(1) })
    }

    fn score_chunk(&self, query: &str, texts: &[String]) -> Result<Vec<f32>> {
        let encodings = encode_pairs(&self.tokenizer, query, texts)?;
        let (input_ids, attention_mask) = batch_on_device(&encodings, self.pad_id, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let logits = self.model.forward(&input_ids, &attention_mask, &token_type_ids)?;
        let scores = candle_nn::ops::sigmoid(&logits.squeeze(D::Minus1)?)?;
        Ok(scores.to_device(&Device::Cpu)?.to_vec1()?)
    }
}

impl Reranker for CrossEncoderReranker {
    fn rerank(&self, query: &str, texts: &[String]) -> Result<Vec<f32>> {
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            out.extend(self.score_chunk(query, chunk)?);
        }
        ensure!(out.len() == texts.len(), "reranker returned {} scores for {} texts", out.len(), texts.len());
        Ok(out)
    }
}
