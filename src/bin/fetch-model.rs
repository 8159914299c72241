//! fetch-model - Materialize a full model snapshot into a local directory

use anyhow::Result;
use clap::Parser;
use model_prep::config::FetchConfig;
use model_prep::hub::{snapshot_download, verify_no_symlinks};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fetch-model")]
#[command(about = "Download a full model snapshot from HuggingFace Hub", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the model repository id
    #[arg(long)]
    model_id: Option<String>,

    /// Override the destination directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Override the repository revision
    #[arg(long)]
    revision: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log format (json or pretty)
    #[arg(long, default_value = "pretty")]
    log_format: String,
}

#[tokio::main]
async fn main() -> Result<()> {
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
    let mut config = FetchConfig::load(cli.config)?;

    // CLI overrides
    if let Some(model_id) = cli.model_id {
        config.model_id = model_id;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(revision) = cli.revision {
        config.revision = revision;
    }

    config.validate()?;

    tracing::info!(
        model_id = %config.model_id,
        output_dir = ?config.output_dir,
        "Configuration loaded"
    );

    println!("Downloading model: {}", config.model_id);
    println!("This can take a while on first run...");

    let report = snapshot_download(&config).await?;

    // Every entry in the destination must be a regular file
    let offenders = verify_no_symlinks(&config.output_dir)?;
    if !offenders.is_empty() {
        anyhow::bail!("Destination contains symlinks: {:?}", offenders);
    }

    println!("Done! Model downloaded to: {}", config.output_dir.display());
    println!(
        "{} files ({} copied, {} already present, {:.2} GiB total)",
        report.files_total,
        report.files_copied,
        report.files_skipped,
        report.bytes_total as f64 / (1024.0 * 1024.0 * 1024.0),
    );

    Ok(())
}
