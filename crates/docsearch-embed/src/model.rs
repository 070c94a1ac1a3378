use std::path::Path;
use std::time::Instant;

use anyhow::{anyhow, Result};
use candle_core::Device;
use candle_transformers::models::xlm_roberta::XLMRobertaModel;
use tokenizers::Tokenizer;

use docsearch_core::traits::Embedder;

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::{batch_on_device, encode_texts, load_tokenizer, pad_id};
use crate::weights::ModelFiles;

/// XLM-RoBERTa sentence embedder (BGE-M3 family) with masked mean pooling.
pub struct EmbeddingModel {
    model: XLMRobertaModel,
    tokenizer: Tokenizer,
    device: Device,
    pad_id: u32,
    id: String,
    dim: usize,
    batch_size: usize,
}

impl EmbeddingModel {
    pub fn load(model_dir: &Path, max_len: usize, batch_size: usize) -> Result<Self> {
        let device = select_device();
        tracing::info!(dir = %model_dir.display(), "loading embedding model");
        let files = ModelFiles::locate(model_dir)?;
        let tokenizer = load_tokenizer(&files.tokenizer, max_len)?;
        let config = files.read_config()?;
        let vb = files.var_builder(&device)?;
        let model = XLMRobertaModel::new(&config, vb)?;
        let name = model_dir.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| "xlm-roberta".to_string());
        let dim = config.hidden_size;
        tracing::info!(model = %name, dim, "embedding model loaded");
        Ok(Self {
            model,
            pad_id: pad_id(&tokenizer),
            tokenizer,
            device,
            id: format!("{name}:d{dim}"),
            dim,
            batch_size: batch_size.max(1),
        })
    }

    fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let encodings = encode_texts(&self.tokenizer, texts)?;
        let (input_ids, attention_mask) = batch_on_device(&encodings, self.pad_id, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let rows: Vec<Vec<f32>> = pooled.to_device(&Device::Cpu)?.to_vec2()?;
        if rows.iter().any(|r| r.len() != self.dim) {
            return Err(anyhow!("model produced vectors of unexpected dimension"));
        }
        Ok(rows)
    }
}

impl Embedder for EmbeddingModel {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            out.extend(self.embed_chunk(chunk)?);
        }
        tracing::debug!(texts = texts.len(), elapsed_ms = start.elapsed().as_millis() as u64, "embedded batch");
        Ok(out)
    }
}

