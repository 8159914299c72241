//! Snapshot download using hf-hub
//!
//! Pulls every file of a model repository through the hub cache and
//! materializes the result as regular files in a destination directory.
//! The cache layer resumes interrupted downloads across runs, so a re-run
//! only fetches what is missing; files already complete in the destination
//! are not copied again.

use hf_hub::api::tokio::{Api, ApiBuilder, ApiRepo};
use hf_hub::{Repo, RepoType};
use std::path::Path;

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::hub::cache::hub_cache_dir;

/// Summary of one fetch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotReport {
    /// Files listed by the remote snapshot
    pub files_total: usize,
    /// Files copied into the destination this run
    pub files_copied: usize,
    /// Files already complete in the destination
    pub files_skipped: usize,
    /// Total size of the snapshot in bytes
    pub bytes_total: u64,
}

/// Download a full model snapshot into the configured destination directory
///
/// Every file the snapshot lists is fetched (full snapshot, never sparse)
/// and written to `output_dir` as a regular file. Network, authentication
/// and disk failures propagate immediately; there is no retry policy.
pub async fn snapshot_download(config: &FetchConfig) -> Result<SnapshotReport, FetchError> {
    tracing::info!(
        model_id = %config.model_id,
        revision = %config.revision,
        output_dir = ?config.output_dir,
        "Starting snapshot download"
    );

    let repo = build_repo(config)?;

    let info = repo.info().await?;
    if info.siblings.is_empty() {
        return Err(FetchError::EmptySnapshot(config.model_id.clone()));
    }
    tracing::info!(files = info.siblings.len(), "Resolved snapshot file list");

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .map_err(|source| FetchError::Materialize {
            path: config.output_dir.clone(),
            source,
        })?;

    let mut report = SnapshotReport {
        files_total: info.siblings.len(),
        ..Default::default()
    };

    for sibling in &info.siblings {
        tracing::debug!(file = %sibling.rfilename, "Fetching file");
        let cached = repo.get(&sibling.rfilename).await?;

        let dest = config.output_dir.join(&sibling.rfilename);
        let copied = materialize_file(&cached, &dest)
            .await
            .map_err(|source| FetchError::Materialize {
                path: dest.clone(),
                source,
            })?;

        let bytes = tokio::fs::metadata(&dest)
            .await
            .map_err(|source| FetchError::Materialize {
                path: dest.clone(),
                source,
            })?
            .len();
        report.bytes_total += bytes;

        if copied {
            report.files_copied += 1;
            tracing::debug!(file = %sibling.rfilename, bytes, "Materialized");
        } else {
            report.files_skipped += 1;
            tracing::debug!(file = %sibling.rfilename, "Already materialized, skipping");
        }
    }

    tracing::info!(
        files = report.files_total,
        copied = report.files_copied,
        skipped = report.files_skipped,
        bytes = report.bytes_total,
        "Snapshot download complete"
    );

    Ok(report)
}

/// Build the hub API client and repository handle
fn build_repo(config: &FetchConfig) -> Result<ApiRepo, FetchError> {
    let cache_dir = config
        .hub_cache_dir
        .clone()
        .unwrap_or_else(hub_cache_dir);
    let mut builder = ApiBuilder::new()
        .with_progress(true)
        .with_cache_dir(cache_dir);
    if let Some(token) = &config.token {
        builder = builder.with_token(Some(token.clone()));
    }
    let api: Api = builder.build()?;

    Ok(api.repo(Repo::with_revision(
        config.model_id.clone(),
        RepoType::Model,
        config.revision.clone(),
    )))
}

/// Copy a cached file into the destination as a regular file.
///
/// The hub cache hands out symlinked paths; copying (rather than linking)
/// keeps the destination free of symlinks. Returns `false` when the
/// destination already holds a regular file of the expected size.
async fn materialize_file(cached: &Path, dest: &Path) -> std::io::Result<bool> {
    let cached_len = tokio::fs::metadata(cached).await?.len();

    match tokio::fs::symlink_metadata(dest).await {
        Ok(meta) if meta.is_file() && meta.len() == cached_len => return Ok(false),
        // Symlink, wrong size or wrong type: replace with a fresh copy
        Ok(_) => tokio::fs::remove_file(dest).await?,
        Err(_) => {}
    }

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::copy(cached, dest).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_materialize_copies_fresh_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cached = temp_dir.path().join("blob");
        std::fs::write(&cached, b"weights").unwrap();
        let dest = temp_dir.path().join("out/model.safetensors");

        let copied = materialize_file(&cached, &dest).await.unwrap();
        assert!(copied);
        assert_eq!(std::fs::read(&dest).unwrap(), b"weights");
        assert!(!std::fs::symlink_metadata(&dest)
            .unwrap()
            .file_type()
            .is_symlink());
    }

    #[tokio::test]
    async fn test_materialize_skips_complete_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cached = temp_dir.path().join("blob");
        std::fs::write(&cached, b"weights").unwrap();
        let dest = temp_dir.path().join("model.safetensors");
        std::fs::write(&dest, b"weights").unwrap();

        let copied = materialize_file(&cached, &dest).await.unwrap();
        assert!(!copied);
    }

    #[tokio::test]
    async fn test_materialize_replaces_partial_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cached = temp_dir.path().join("blob");
        std::fs::write(&cached, b"complete weights").unwrap();
        let dest = temp_dir.path().join("model.safetensors");
        std::fs::write(&dest, b"partial").unwrap();

        let copied = materialize_file(&cached, &dest).await.unwrap();
        assert!(copied);
        assert_eq!(std::fs::read(&dest).unwrap(), b"complete weights");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_materialize_replaces_symlink_with_copy() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cached = temp_dir.path().join("blob");
        std::fs::write(&cached, b"weights").unwrap();
        let dest = temp_dir.path().join("model.safetensors");
        std::os::unix::fs::symlink(&cached, &dest).unwrap();

        let copied = materialize_file(&cached, &dest).await.unwrap();
        assert!(copied);
        let meta = std::fs::symlink_metadata(&dest).unwrap();
        assert!(meta.is_file());
        assert!(!meta.file_type().is_symlink());
        assert_eq!(std::fs::read(&dest).unwrap(), b"weights");
    }

    #[tokio::test]
    async fn test_materialize_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cached = temp_dir.path().join("blob");
        std::fs::write(&cached, b"weights").unwrap();
        let dest = temp_dir.path().join("model.safetensors");

        assert!(materialize_file(&cached, &dest).await.unwrap());
        assert!(!materialize_file(&cached, &dest).await.unwrap());
        assert!(!materialize_file(&cached, &dest).await.unwrap());
        assert_eq!(std::fs::read(&dest).unwrap(), b"weights");
    }

    #[test]
    fn test_api_builder_with_cache_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = FetchConfig {
            hub_cache_dir: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };
        assert!(build_repo(&config).is_ok());
    }
}
