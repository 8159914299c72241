//! Sampled autoregressive decoding
//!
//! Feeds the full prompt through the model once, then produces one token
//! per step against the KV cache, sampling from the temperature-shaped
//! distribution until an end-of-sequence token or the new-token cap.

use candle_core::{DType, Tensor};
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::llama::Cache;

use super::loader::LoadedModel;
use crate::config::GenerationConfig;
use crate::error::SmokeError;

/// Tokens produced by one generation run
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    /// Prompt tokens followed by everything the model produced
    pub tokens: Vec<u32>,
    pub prompt_tokens: usize,
    /// New tokens, end-of-sequence included when one was sampled
    pub generated_tokens: usize,
}

/// Run a bounded sampled generation from the given prompt tokens
pub fn generate(
    bundle: &LoadedModel,
    prompt_ids: &[u32],
    params: &GenerationConfig,
) -> Result<GenerationOutput, SmokeError> {
    let mut cache = Cache::new(true, bundle.dtype, &bundle.config, &bundle.device)?;
    let mut logits_processor =
        LogitsProcessor::new(params.seed, Some(params.temperature), params.top_p);

    let mut tokens: Vec<u32> = prompt_ids.to_vec();
    let prompt_tokens = prompt_ids.len();
    let mut index_pos = 0;

    tracing::debug!(
        prompt_tokens,
        max_new_tokens = params.max_new_tokens,
        temperature = params.temperature,
        "Starting generation"
    );

    for step in 0..params.max_new_tokens {
        // Whole prompt on the first pass, a single token per step after
        let (context, context_index) = if step == 0 {
            (&tokens[..], 0)
        } else {
            (&tokens[tokens.len() - 1..], index_pos)
        };

        let input = Tensor::new(context, &bundle.device)?.unsqueeze(0)?;
        let logits = bundle.model.forward(&input, context_index, &mut cache)?;
        let logits = logits.squeeze(0)?.to_dtype(DType::F32)?;
        index_pos += context.len();

        let next_token = logits_processor.sample(&logits)?;
        tokens.push(next_token);

        // The terminating token counts as generated, as the reference
        // stack counts it
        if bundle.eos_token_ids.contains(&next_token) {
            tracing::debug!(step, token = next_token, "End-of-sequence sampled");
            break;
        }
    }

    let generated_tokens = tokens.len() - prompt_tokens;
    tracing::debug!(generated_tokens, "Generation finished");

    Ok(GenerationOutput {
        tokens,
        prompt_tokens,
        generated_tokens,
    })
}
