use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::Config as XLMRobertaConfig;

/// Files every model directory must provide.
pub struct ModelFiles {
    pub tokenizer: PathBuf,
    pub config: PathBuf,
    pub weights: PathBuf,
}

impl ModelFiles {
    /// Prefers `model.safetensors`, falls back to `pytorch_model.bin`.
    pub fn locate(model_dir: &Path) -> Result<Self> {
        let safetensors = model_dir.join("model.safetensors");
        let pickle = model_dir.join("pytorch_model.bin");
        let weights = if safetensors.exists() {
            safetensors
        } else if pickle.exists() {
            pickle
        } else {
            return Err(anyhow!("No model weights found in {}", model_dir.display()));
        };
        Ok(Self { tokenizer: model_dir.join("tokenizer.json"), config: model_dir.join("config.json"), weights })
    }

    pub fn read_config(&self) -> Result<XLMRobertaConfig> {
        let raw = std::fs::read_to_string(&self.config)
            .with_context(|| format!("read model config {}", self.config.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse model config {}", self.config.display()))
    }

    pub fn var_builder(&self, device: &Device) -> Result<VarBuilder<'static>> {
        let tensors: HashMap<String, Tensor> = if self.weights.extension().is_some_and(|e| e == "safetensors") {
            candle_core::safetensors::load(&self.weights, device)?
        } else {
            candle_core::pickle::read_all(&self.weights)?.into_iter().collect()
        };
        tracing::debug!(tensors = tensors.len(), path = %self.weights.display(), "loaded weights");
        Ok(VarBuilder::from_tensors(tensors, DType::F32, device))
    }
}
