//! Configuration structures and loading logic
//!
//! Both tools are configured through an explicit structure instead of
//! hardcoded literals: built-in defaults, then an optional TOML file, then
//! environment variables. CLI flag overrides are applied by the binaries.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the snapshot fetcher
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Model repository on the hub, e.g. `org/name`
    pub model_id: String,

    /// Directory the snapshot is materialized into
    pub output_dir: PathBuf,

    /// Repository revision to fetch
    pub revision: String,

    /// Access token for gated or private repositories.
    /// Falls back to the hub client's cached credentials when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Override for the hub cache directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hub_cache_dir: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            output_dir: default_model_dir(),
            revision: default_revision(),
            token: None,
            hub_cache_dir: None,
        }
    }
}

impl FetchConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config: Self = if let Some(path) = path {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content).context("Failed to parse TOML config")?
        } else {
            Self::default()
        };

        // Environment variable overrides
        if let Ok(model_id) = std::env::var("MODEL_PREP_MODEL_ID") {
            config.model_id = model_id;
        }
        if let Ok(output_dir) = std::env::var("MODEL_PREP_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(output_dir);
        }
        if let Ok(revision) = std::env::var("MODEL_PREP_REVISION") {
            config.revision = revision;
        }
        if let Ok(token) = std::env::var("HF_TOKEN") {
            config.token = Some(token);
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        validate_model_id(&self.model_id)?;

        if self.output_dir.as_os_str().is_empty() {
            anyhow::bail!("Output directory cannot be empty");
        }
        if self.revision.is_empty() {
            anyhow::bail!("Revision cannot be empty");
        }

        Ok(())
    }
}

/// Sampling parameters for the smoke-test generation
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// Maximum number of new tokens to produce
    pub max_new_tokens: usize,

    /// Sampling temperature; must be positive (greedy decoding is not
    /// what a sampling smoke test should exercise)
    pub temperature: f64,

    /// Optional nucleus sampling cutoff
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,

    /// RNG seed for the sampler
    pub seed: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: default_max_new_tokens(),
            temperature: default_temperature(),
            top_p: None,
            seed: default_seed(),
        }
    }
}

/// Weight precision requested for model loading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightDtype {
    /// Half precision on an accelerator, full precision on CPU
    Auto,
    F16,
    Bf16,
    F32,
}

/// Configuration for the checkpoint smoke test
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SmokeTestConfig {
    /// Local directory holding the downloaded checkpoint
    pub model_dir: PathBuf,

    /// Single user message sent through the chat template
    pub prompt: String,

    /// Weight precision for model loading
    pub dtype: WeightDtype,

    pub generation: GenerationConfig,
}

impl Default for SmokeTestConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            prompt: default_prompt(),
            dtype: WeightDtype::Auto,
            generation: GenerationConfig::default(),
        }
    }
}

impl SmokeTestConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config: Self = if let Some(path) = path {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content).context("Failed to parse TOML config")?
        } else {
            Self::default()
        };

        // Environment variable overrides
        if let Ok(model_dir) = std::env::var("MODEL_PREP_MODEL_DIR") {
            config.model_dir = PathBuf::from(model_dir);
        }
        if let Ok(prompt) = std::env::var("MODEL_PREP_PROMPT") {
            config.prompt = prompt;
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.model_dir.as_os_str().is_empty() {
            anyhow::bail!("Model directory cannot be empty");
        }
        if self.prompt.is_empty() {
            anyhow::bail!("Prompt cannot be empty");
        }
        if self.generation.max_new_tokens == 0 {
            anyhow::bail!("max_new_tokens must be at least 1");
        }
        if self.generation.temperature <= 0.0 {
            anyhow::bail!(
                "Temperature must be positive (got {})",
                self.generation.temperature
            );
        }
        if let Some(top_p) = self.generation.top_p
            && !(0.0..=1.0).contains(&top_p)
        {
            anyhow::bail!("top_p must be within [0, 1] (got {})", top_p);
        }

        Ok(())
    }
}

fn validate_model_id(model_id: &str) -> Result<()> {
    if model_id.is_empty() {
        anyhow::bail!("Model id cannot be empty");
    }
    if model_id.chars().any(char::is_whitespace) {
        anyhow::bail!("Model id '{}' cannot contain whitespace", model_id);
    }
    if model_id.starts_with('/') || model_id.ends_with('/') {
        anyhow::bail!("Model id '{}' cannot start or end with '/'", model_id);
    }
    if model_id.matches('/').count() > 1 {
        anyhow::bail!("Model id '{}' must be 'name' or 'org/name'", model_id);
    }
    Ok(())
}

fn default_model_id() -> String {
    // The upstream checkpoint this tooling was built around; already a
    // merged model, not an adapter.
    "professorsynapse/nexus-tools_sft17".to_string()
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("./nexus-tools-merged")
}

fn default_revision() -> String {
    "main".to_string()
}

fn default_prompt() -> String {
    "Hello! What can you help me with?".to_string()
}

fn default_max_new_tokens() -> usize {
    100
}

fn default_temperature() -> f64 {
    0.7
}

fn default_seed() -> u64 {
    299792458
}
