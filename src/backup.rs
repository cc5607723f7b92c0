use crate::error::{AppError, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

const SECONDS_PER_DAY: u64 = 86_400;

/// Keeps timestamped copies of playlists before they are replaced.
///
/// Backups are advisory: a failed copy is logged and never stops the new
/// playlist from being written.
#[derive(Debug, Clone)]
pub struct BackupManager {
    backup_dir: PathBuf,
}

impl BackupManager {
    pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            backup_dir: backup_dir.into(),
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Copies `path` into the backup directory if it exists.
    ///
    /// Returns the backup location, or `None` when there was nothing to copy
    /// or the copy failed.
    pub async fn backup_if_exists(&self, path: &Path) -> Option<PathBuf> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return None;
        }

        match self.backup(path, Local::now()).await {
            Ok(target) => {
                debug!(from = %path.display(), to = %target.display(), "Backed up playlist");
                Some(target)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Backup failed");
                None
            }
        }
    }

    async fn backup(&self, path: &Path, at: DateTime<Local>) -> Result<PathBuf> {
        let name = backup_file_name(path, &at)
            .ok_or_else(|| AppError::Backup(format!("{} has no file name", path.display())))?;
        let target = self.backup_dir.join(name);

        tokio::fs::create_dir_all(&self.backup_dir)
            .await
            .map_err(|e| AppError::Backup(format!("{}: {}", self.backup_dir.display(), e)))?;
        tokio::fs::copy(path, &target).await.map_err(|e| {
            AppError::Backup(format!(
                "{} -> {}: {}",
                path.display(),
                target.display(),
                e
            ))
        })?;

        Ok(target)
    }

    /// Deletes backups last modified more than `retention_days` ago.
    ///
    /// Returns the number of files removed.
    pub async fn prune(&self, retention_days: u64) -> usize {
        let removed = remove_expired(&self.backup_dir, retention_days, |_| true).await;
        if removed > 0 {
            info!(count = removed, "Removed expired backups");
        }
        removed
    }
}

/// `<stem>_<YYYYMMDD_HHMMSS><suffix>` for `path` at time `at`.
pub fn backup_file_name(path: &Path, at: &DateTime<Local>) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();
    let suffix = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    Some(format!("{}_{}{}", stem, at.format("%Y%m%d_%H%M%S"), suffix))
}

/// Deletes regular files in `dir` whose names pass `filter` and whose
/// modification time is older than `retention_days`.
///
/// Failures on individual files are logged and skipped.
pub async fn remove_expired<F>(dir: &Path, retention_days: u64, filter: F) -> usize
where
    F: Fn(&str) -> bool,
{
    let age = Duration::from_secs(retention_days.saturating_mul(SECONDS_PER_DAY));
    let Some(cutoff) = SystemTime::now().checked_sub(age) else {
        return 0;
    };

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Cannot read directory for cleanup");
            return 0;
        }
    };

    let mut removed = 0;
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Directory listing interrupted");
                break;
            }
        };

        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| filter(name));
        if !matches {
            continue;
        }

        let modified = match entry.metadata().await {
            Ok(meta) if meta.is_file() => meta.modified(),
            Ok(_) => continue,
            Err(e) => Err(e),
        };

        match modified {
            Ok(modified) if modified < cutoff => match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    removed += 1;
                    debug!(path = %path.display(), "Deleted expired file");
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to delete expired file"),
            },
            Ok(_) => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Cannot read file age"),
        }
    }

    removed
}
