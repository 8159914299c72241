//! smoke-test - Load a local checkpoint and run one chat generation
//!
//! Verifies a downloaded model can generate text before it goes into the
//! conversion pipeline.

use anyhow::Result;
use clap::Parser;
use model_prep::config::SmokeTestConfig;
use model_prep::generation::run_smoke_test;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "smoke-test")]
#[command(about = "Sanity-check a local checkpoint with a single chat generation", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the checkpoint directory
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Override the test prompt
    #[arg(long)]
    prompt: Option<String>,

    /// Override the new-token cap
    #[arg(long)]
    max_new_tokens: Option<usize>,

    /// Override the sampling temperature
    #[arg(long)]
    temperature: Option<f64>,

    /// Override the sampling seed
    #[arg(long)]
    seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log format (json or pretty)
    #[arg(long, default_value = "pretty")]
    log_format: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    match cli.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(&cli.log_level)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(&cli.log_level)
                .init();
        }
    }

    // Load configuration
    let mut config = SmokeTestConfig::load(cli.config)?;

    // CLI overrides
    if let Some(model_dir) = cli.model_dir {
        config.model_dir = model_dir;
    }
    if let Some(prompt) = cli.prompt {
        config.prompt = prompt;
    }
    if let Some(max_new_tokens) = cli.max_new_tokens {
        config.generation.max_new_tokens = max_new_tokens;
    }
    if let Some(temperature) = cli.temperature {
        config.generation.temperature = temperature;
    }
    if let Some(seed) = cli.seed {
        config.generation.seed = seed;
    }

    config.validate()?;

    tracing::info!(
        model_dir = ?config.model_dir,
        max_new_tokens = config.generation.max_new_tokens,
        temperature = config.generation.temperature,
        "Configuration loaded"
    );

    let report = run_smoke_test(&config)?;

    println!("Prompt: {}...", report.prompt_preview());
    println!("Input tokens: {}", report.input_tokens);
    println!("\nFull response:\n{}", report.response);
    println!("\nGenerated {} tokens", report.generated_tokens);

    Ok(())
}
