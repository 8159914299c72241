//! Hub snapshot retrieval
//!
//! Provides functionality for:
//! - Downloading a full model snapshot from HuggingFace Hub
//! - Materializing the snapshot as regular files in a local directory
//! - Auditing and sizing the materialized directory

pub mod cache;
pub mod download;

pub use cache::{dir_size, hub_cache_dir, verify_no_symlinks};
pub use download::{SnapshotReport, snapshot_download};
