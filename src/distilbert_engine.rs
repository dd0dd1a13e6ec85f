use anyhow::{Result, bail};
use async_trait::async_trait;
use candle_core::utils::{cuda_is_available, metal_is_available};
use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::ops::softmax;
use candle_nn::{Linear, Module, VarBuilder, linear};
use candle_transformers::models::distilbert::{Config as DistilBertConfig, DistilBertModel};
use hf_hub::{Repo, RepoType, api::tokio::Api};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokenizers::Tokenizer;

use crate::engine::Classifier;

/// Fine-tuned DistilBERT multilingual (cased) e-mail classifier.
pub const MODEL_ID: &str = "gabubits/triage-portuguese";

const NUM_LABELS: usize = 2;

/// `DistilBertForSequenceClassification` running on candle.
pub struct DistilBertEngine {
    inner: Arc<Inner>,
    model_name: String,
}

struct Inner {
    model: DistilBertModel,
    pre_classifier: Linear,
    classifier: Linear,
    tokenizer: Tokenizer,
    device: Device,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub model_path: Option<PathBuf>,
    pub revision: String,
    pub use_pth: bool,
    pub cpu: bool,
    pub max_sequence_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            revision: "main".to_string(),
            use_pth: false,
            cpu: false,
            max_sequence_length: 256,
        }
    }
}

/// Fields of `config.json` the classification head needs.
#[derive(Debug, Deserialize)]
struct HeadConfig {
    dim: usize,
    #[serde(default)]
    id2label: HashMap<String, String>,
}

impl DistilBertEngine {
    fn device(cpu: bool) -> Result<Device> {
        if cpu {
            Ok(Device::Cpu)
        } else if metal_is_available() {
            tracing::info!("Using metal acceleration");
            Ok(Device::new_metal(0)?)
        } else if cuda_is_available() {
            tracing::info!("Using CUDA GPU acceleration");
            Ok(Device::new_cuda(0)?)
        } else {
            tracing::info!(
                "CUDA not available, running on CPU. To run on GPU, build with `--features cuda`"
            );
            Ok(Device::Cpu)
        }
    }

    #[tracing::instrument(skip(config), fields(model_path = ?config.model_path, cpu = config.cpu))]
    pub async fn new(config: EngineConfig) -> Result<Self> {
        let device = Self::device(config.cpu)?;

        // Get files from either the HuggingFace API, or from a local copy of the same model
        let (config_filename, tokenizer_filename, weights_filename) = match &config.model_path {
            Some(base_path) => {
                if !base_path.is_dir() {
                    bail!("Model path {} is not a directory.", base_path.display());
                }

                let config_file = base_path.join("config.json");
                let tokenizer_file = base_path.join("tokenizer.json");
                let weights_file = if config.use_pth {
                    base_path.join("pytorch_model.bin")
                } else {
                    base_path.join("model.safetensors")
                };
                (config_file, tokenizer_file, weights_file)
            }
            None => {
                let repo = Repo::with_revision(
                    MODEL_ID.to_string(),
                    RepoType::Model,
                    config.revision.clone(),
                );
                let api = Api::new()?;
                let api = api.repo(repo);
                let config_file = api.get("config.json").await?;
                let tokenizer_file = api.get("tokenizer.json").await?;
                let weights_file = if config.use_pth {
                    api.get("pytorch_model.bin").await?
                } else {
                    api.get("model.safetensors").await?
                };
                (config_file, tokenizer_file, weights_file)
            }
        };

        let raw_config = std::fs::read_to_string(config_filename)?;
        let model_config: DistilBertConfig = serde_json::from_str(&raw_config)?;
        let head_config: HeadConfig = serde_json::from_str(&raw_config)?;

        if !head_config.id2label.is_empty() && head_config.id2label.len() != NUM_LABELS {
            bail!(
                "Expected a {NUM_LABELS}-label classifier, model config declares {} labels",
                head_config.id2label.len()
            );
        }
        tracing::debug!(id2label = ?head_config.id2label, "Model labels");

        let mut tokenizer = Tokenizer::from_file(tokenizer_filename)
            .map_err(|e| anyhow::anyhow!("Tokenizer error: {e}"))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: config.max_sequence_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Tokenizer truncation error: {e}"))?;

        let vb = if config.use_pth {
            VarBuilder::from_pth(&weights_filename, DType::F32, &device)?
        } else {
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_filename], DType::F32, &device)? }
        };

        let model = DistilBertModel::load(vb.pp("distilbert"), &model_config)?;
        let pre_classifier = linear(head_config.dim, head_config.dim, vb.pp("pre_classifier"))?;
        let classifier = linear(head_config.dim, NUM_LABELS, vb.pp("classifier"))?;

        Ok(Self {
            inner: Arc::new(Inner {
                model,
                pre_classifier,
                classifier,
                tokenizer,
                device,
            }),
            model_name: MODEL_ID.to_string(),
        })
    }
}

impl Inner {
    fn probabilities(&self, text: &str) -> Result<[f32; 2]> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("Tokenization error: {e}"))?;
        let ids = encoding.get_ids();
        let seq_len = ids.len();

        let input_ids = Tensor::new(ids, &self.device)?.unsqueeze(0)?;
        // Non-zero entries are masked out; one unpadded sequence attends everywhere.
        let attention_mask = Tensor::zeros((seq_len, seq_len), DType::U8, &self.device)?;

        let hidden = self.model.forward(&input_ids, &attention_mask)?;
        let cls = hidden.i((.., 0))?;
        let pooled = self.pre_classifier.forward(&cls)?.relu()?;
        let logits = self.classifier.forward(&pooled)?;

        let scores = softmax(&logits, 1)?.to_vec2::<f32>()?;
        match scores.first().map(Vec::as_slice) {
            Some(&[improdutivo, produtivo]) => Ok([improdutivo, produtivo]),
            other => bail!("Unexpected classifier output: {other:?}"),
        }
    }
}

#[async_trait]
impl Classifier for DistilBertEngine {
    #[tracing::instrument(skip(self, text), fields(bytes = text.len()))]
    async fn classify(&self, text: &str) -> Result<[f32; 2]> {
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();
        let probs = tokio::task::spawn_blocking(move || inner.probabilities(&text)).await??;
        tracing::debug!(?probs, "Inference finished");
        Ok(probs)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
