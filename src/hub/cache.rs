//! Hub cache and destination-directory utilities
//!
//! The hub client keeps its own content-addressed cache; the fetcher copies
//! out of it into a plain destination tree. These helpers resolve the cache
//! location and audit the destination.

use std::path::{Path, PathBuf};

/// Get the HuggingFace cache directory
///
/// Checks in order:
/// 1. `$HF_HOME/hub`
/// 2. `$XDG_CACHE_HOME/huggingface/hub`
/// 3. `~/.cache/huggingface/hub`
pub fn hub_cache_dir() -> PathBuf {
    // Check HF_HOME first
    if let Ok(hf_home) = std::env::var("HF_HOME") {
        return PathBuf::from(hf_home).join("hub");
    }

    // Check XDG_CACHE_HOME
    if let Ok(xdg_cache) = std::env::var("XDG_CACHE_HOME") {
        return PathBuf::from(xdg_cache).join("huggingface/hub");
    }

    // Default to ~/.cache/huggingface/hub
    dirs::home_dir()
        .map(|h| h.join(".cache/huggingface/hub"))
        .unwrap_or_else(|| PathBuf::from("/tmp/huggingface/hub"))
}

/// Walk a materialized snapshot directory and collect any symbolic links.
///
/// A clean destination contains regular files only; the hub cache reaches
/// consumers through symlinks, so a link here means a file escaped
/// materialization.
pub fn verify_no_symlinks(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut offenders = Vec::new();
    collect_symlinks(dir, &mut offenders)?;
    Ok(offenders)
}

fn collect_symlinks(path: &Path, offenders: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let entry_path = entry.path();
        let meta = std::fs::symlink_metadata(&entry_path)?;
        if meta.file_type().is_symlink() {
            offenders.push(entry_path);
        } else if meta.is_dir() {
            collect_symlinks(&entry_path, offenders)?;
        }
    }
    Ok(())
}

/// Recursively calculate directory size
pub fn dir_size(path: &Path) -> u64 {
    let mut size = 0;

    if let Ok(entries) = std::fs::read_dir(path) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                size += dir_size(&path);
            } else if let Ok(metadata) = std::fs::metadata(&path) {
                size += metadata.len();
            }
        }
    }

    size
}
