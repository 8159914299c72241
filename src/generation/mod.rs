//! Checkpoint smoke test
//!
//! Verifies an already-downloaded checkpoint can load and produce a
//! generation for a minimal one-turn chat prompt. The pipeline is linear:
//! load, render prompt, tokenize, generate, decode, report. Any failing
//! step propagates; there is no retry and no partial result.

pub mod loader;
pub mod sampler;

pub use loader::{LoadedModel, load_model};
pub use sampler::{GenerationOutput, generate};

use crate::chat::Message;
use crate::config::SmokeTestConfig;
use crate::error::SmokeError;

/// Characters of the rendered prompt shown in the report preview
const PROMPT_PREVIEW_CHARS: usize = 200;

/// Everything the smoke test reports
#[derive(Debug, Clone)]
pub struct SmokeReport {
    /// The fully rendered chat prompt
    pub prompt: String,
    /// Prompt length in tokens
    pub input_tokens: usize,
    /// The full sequence decoded with special tokens skipped
    pub response: String,
    /// New tokens produced (total output minus input)
    pub generated_tokens: usize,
}

impl SmokeReport {
    /// Prompt preview, truncated on a character boundary
    pub fn prompt_preview(&self) -> &str {
        match self.prompt.char_indices().nth(PROMPT_PREVIEW_CHARS) {
            Some((idx, _)) => &self.prompt[..idx],
            None => &self.prompt,
        }
    }
}

/// Load the checkpoint under test and run one bounded chat generation
pub fn run_smoke_test(config: &SmokeTestConfig) -> Result<SmokeReport, SmokeError> {
    let bundle = load_model(config)?;

    let messages = vec![Message::user(config.prompt.clone())];
    let prompt = bundle.template.apply(&messages, true)?;
    tracing::debug!(chars = prompt.len(), "Rendered chat prompt");

    let encoding = bundle
        .tokenizer
        .encode(prompt.as_str(), true)
        .map_err(|e| SmokeError::Tokenizer(e.to_string()))?;
    let prompt_ids = encoding.get_ids();
    tracing::info!(input_tokens = prompt_ids.len(), "Prompt tokenized");

    tracing::info!("Generating test response");
    let output = generate(&bundle, prompt_ids, &config.generation)?;

    let response = bundle
        .tokenizer
        .decode(&output.tokens, true)
        .map_err(|e| SmokeError::Tokenizer(e.to_string()))?;

    Ok(SmokeReport {
        prompt,
        input_tokens: output.prompt_tokens,
        response,
        generated_tokens: output.generated_tokens,
    })
}
