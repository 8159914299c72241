//! Checkpoint loading
//!
//! Loads everything the smoke test needs out of a local snapshot directory:
//! tokenizer, chat template, model config and safetensors weights, with
//! reduced-precision weights placed on the best available device.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use candle_transformers::models::llama::{Config, Llama, LlamaConfig, LlamaEosToks};
use serde::Deserialize;
use tokenizers::Tokenizer;

use crate::chat::ChatTemplate;
use crate::config::{SmokeTestConfig, WeightDtype};
use crate::error::SmokeError;

/// Vocab entries probed when neither the model config nor the tokenizer
/// config names an end-of-sequence token
const EOS_CANDIDATES: &[&str] = &["</s>", "<|endoftext|>", "<|im_end|>", "<|eot_id|>"];

/// A fully loaded checkpoint, ready for generation
pub struct LoadedModel {
    pub model: Llama,
    pub tokenizer: Tokenizer,
    pub template: ChatTemplate,
    pub config: Config,
    pub device: Device,
    pub dtype: DType,
    /// Token ids that terminate generation
    pub eos_token_ids: Vec<u32>,
    /// Padding id; never exercised by a single unbatched sequence but
    /// resolved so batched callers have it
    pub pad_token_id: u32,
}

/// Subset of `tokenizer_config.json` this crate reads
#[derive(Debug, Default, Deserialize)]
struct TokenizerFileConfig {
    chat_template: Option<String>,
    bos_token: Option<TokenEntry>,
    eos_token: Option<TokenEntry>,
    pad_token: Option<TokenEntry>,
}

/// Special-token fields appear either as a bare string or as an
/// added-token object carrying a `content` field
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokenEntry {
    Plain(String),
    Tagged { content: String },
}

impl TokenEntry {
    fn content(&self) -> &str {
        match self {
            TokenEntry::Plain(s) => s,
            TokenEntry::Tagged { content } => content,
        }
    }
}

/// Load tokenizer, chat template, config and weights from `model_dir`
pub fn load_model(config: &SmokeTestConfig) -> Result<LoadedModel, SmokeError> {
    let dir = config.model_dir.as_path();

    tracing::info!(model_dir = ?dir, "Loading tokenizer");
    let tokenizer_path = require_file(dir, "tokenizer.json")?;
    let tokenizer =
        Tokenizer::from_file(&tokenizer_path).map_err(|e| SmokeError::Tokenizer(e.to_string()))?;

    let tokenizer_config = read_tokenizer_config(dir)?;

    let model_config_path = require_file(dir, "config.json")?;
    let llama_config: LlamaConfig =
        serde_json::from_slice(&std::fs::read(&model_config_path)?)?;
    let model_config = llama_config.into_config(false);

    let device = select_device()?;
    let dtype = select_dtype(config.dtype, &device);

    let weight_paths = weight_files(dir)?;
    tracing::info!(
        files = weight_paths.len(),
        device = ?device,
        dtype = ?dtype,
        "Loading model weights (this may take a while)"
    );
    let vb = unsafe { VarBuilder::from_mmaped_safetensors(&weight_paths, dtype, &device)? };
    let model = Llama::load(vb, &model_config)?;

    let eos_token_ids = resolve_eos_ids(&model_config, &tokenizer_config, &tokenizer)?;
    let pad_token_id = tokenizer_config
        .pad_token
        .as_ref()
        .and_then(|t| tokenizer.token_to_id(t.content()))
        .unwrap_or(eos_token_ids[0]);

    let bos_token = tokenizer_config
        .bos_token
        .as_ref()
        .map(|t| t.content().to_string())
        .unwrap_or_default();
    let eos_token = tokenizer_config
        .eos_token
        .as_ref()
        .map(|t| t.content().to_string())
        .unwrap_or_default();

    let template = match tokenizer_config.chat_template {
        Some(source) => ChatTemplate::new(source, bos_token, eos_token)?,
        None => {
            tracing::warn!("Checkpoint ships no chat template, falling back to ChatML");
            ChatTemplate::chatml(bos_token, eos_token)?
        }
    };

    tracing::info!(
        eos_token_ids = ?eos_token_ids,
        pad_token_id,
        "Model loaded successfully"
    );

    Ok(LoadedModel {
        model,
        tokenizer,
        template,
        config: model_config,
        device,
        dtype,
        eos_token_ids,
        pad_token_id,
    })
}

fn require_file(dir: &Path, name: &str) -> Result<PathBuf, SmokeError> {
    let path = dir.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(SmokeError::MissingFile(path))
    }
}

fn read_tokenizer_config(dir: &Path) -> Result<TokenizerFileConfig, SmokeError> {
    let path = dir.join("tokenizer_config.json");
    if !path.is_file() {
        return Ok(TokenizerFileConfig::default());
    }
    Ok(serde_json::from_slice(&std::fs::read(&path)?)?)
}

/// Resolve the weight file set: a single `model.safetensors`, or every
/// shard named by `model.safetensors.index.json`
fn weight_files(dir: &Path) -> Result<Vec<PathBuf>, SmokeError> {
    let index_path = dir.join("model.safetensors.index.json");
    if index_path.is_file() {
        let index: serde_json::Value = serde_json::from_slice(&std::fs::read(&index_path)?)?;
        let shards: HashSet<&str> = index
            .get("weight_map")
            .and_then(|v| v.as_object())
            .map(|m| m.values().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();

        if shards.is_empty() {
            return Err(SmokeError::Config(format!(
                "{index_path:?} has no weight_map entries"
            )));
        }

        let mut shards: Vec<&str> = shards.into_iter().collect();
        shards.sort_unstable();

        return shards
            .into_iter()
            .map(|shard| require_file(dir, shard))
            .collect();
    }

    require_file(dir, "model.safetensors").map(|p| vec![p])
}

/// Automatic device placement: accelerator when one is available
fn select_device() -> Result<Device, SmokeError> {
    let device = Device::cuda_if_available(0)?;
    if device.is_cuda() {
        tracing::info!("Using CUDA device 0");
    } else {
        tracing::info!("No accelerator available, using CPU");
    }
    Ok(device)
}

fn select_dtype(requested: WeightDtype, device: &Device) -> DType {
    match requested {
        WeightDtype::Auto => {
            if device.is_cuda() {
                DType::F16
            } else {
                DType::F32
            }
        }
        WeightDtype::F16 => DType::F16,
        WeightDtype::Bf16 => DType::BF16,
        WeightDtype::F32 => DType::F32,
    }
}

/// End-of-sequence ids: model config first, then the tokenizer config's
/// named token, then well-known vocab entries
fn resolve_eos_ids(
    model_config: &Config,
    tokenizer_config: &TokenizerFileConfig,
    tokenizer: &Tokenizer,
) -> Result<Vec<u32>, SmokeError> {
    if let Some(eos) = &model_config.eos_token_id {
        let ids = match eos {
            LlamaEosToks::Single(id) => vec![*id],
            LlamaEosToks::Multiple(ids) => ids.clone(),
        };
        if !ids.is_empty() {
            return Ok(ids);
        }
    }

    if let Some(entry) = &tokenizer_config.eos_token
        && let Some(id) = tokenizer.token_to_id(entry.content())
    {
        return Ok(vec![id]);
    }

    for candidate in EOS_CANDIDATES {
        if let Some(id) = tokenizer.token_to_id(candidate) {
            return Ok(vec![id]);
        }
    }

    Err(SmokeError::Config(
        "Cannot determine an end-of-sequence token id".to_string(),
    ))
}
