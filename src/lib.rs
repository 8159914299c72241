//! model-prep - checkpoint fetch and smoke-test tools
//!
//! A small library behind two command-line tools: `fetch-model` materializes
//! a complete model snapshot from HuggingFace Hub into a local directory, and
//! `smoke-test` loads that directory and runs a single chat generation to
//! verify the checkpoint before conversion.

pub mod chat;
pub mod config;
pub mod error;
pub mod generation;
pub mod hub;

pub use chat::{ChatTemplate, Message, Role};
pub use config::{FetchConfig, GenerationConfig, SmokeTestConfig, WeightDtype};
pub use error::{FetchError, SmokeError};
pub use generation::{SmokeReport, run_smoke_test};
pub use hub::{SnapshotReport, snapshot_download};
