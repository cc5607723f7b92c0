//! Whole-file replacement helpers.
//!
//! Content is written to a hidden sibling file first and then renamed over
//! the target, so readers only ever see the previous or the new version.

use std::io;
use std::path::{Path, PathBuf};

/// Path of the temporary sibling used while replacing `path`.
pub fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.part", name))
}

pub async fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let partial = partial_path(path);
    tokio::fs::write(&partial, contents).await?;
    if let Err(e) = tokio::fs::rename(&partial, path).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e);
    }
    Ok(())
}

pub fn write_atomic_sync(path: &Path, contents: &[u8]) -> io::Result<()> {
    let partial = partial_path(path);
    std::fs::write(&partial, contents)?;
    if let Err(e) = std::fs::rename(&partial, path) {
        let _ = std::fs::remove_file(&partial);
        return Err(e);
    }
    Ok(())
}
