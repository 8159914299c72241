//! Error types for the fetch and smoke-test procedures

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while materializing a hub snapshot
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Hub API error: {0}")]
    Api(#[from] hf_hub::api::tokio::ApiError),

    #[error("Snapshot for '{0}' lists no files")]
    EmptySnapshot(String),

    #[error("Failed to materialize {path:?}: {source}")]
    Materialize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while loading or exercising a local checkpoint
#[derive(Debug, Error)]
pub enum SmokeError {
    #[error("Missing checkpoint file: {0:?}")]
    MissingFile(PathBuf),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Chat template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Model error: {0}")]
    Model(#[from] candle_core::Error),

    #[error("Checkpoint config error: {0}")]
    Config(String),

    #[error("Invalid checkpoint JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
