use crate::backup::BackupManager;
use crate::config::Config;
use crate::encoding::EncodingDetector;
use crate::error::{AppError, Result};
use crate::http::HttpClient;
use crate::models::{DownloadOutcome, PersistedPlaylist, SourceDefinition};
use crate::storage;
use crate::validation::{channel_count, is_valid_playlist};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// How many times a source is attempted and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    pub retry_count: u32,
    pub retry_delay: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            retry_count: 3,
            retry_delay: Duration::from_secs(5),
        }
    }
}

impl FetchPolicy {
    /// Number of attempts actually made; never less than one.
    pub fn attempts(&self) -> u32 {
        self.retry_count.max(1)
    }
}

/// Downloads, validates and stores a single playlist source.
///
/// # Fields
/// * `client` - Shared HTTP client
/// * `detector` - Picks the text encoding of downloaded bodies
/// * `backups` - Present when backups before overwrite are enabled
/// * `data_dir` - Directory holding the current playlists
/// * `policy` - Attempt count and delay between attempts
pub struct SourceFetcher {
    client: Arc<dyn HttpClient>,
    detector: EncodingDetector,
    backups: Option<BackupManager>,
    data_dir: PathBuf,
    policy: FetchPolicy,
}

impl SourceFetcher {
    pub fn new(client: Arc<dyn HttpClient>, data_dir: impl Into<PathBuf>, policy: FetchPolicy) -> Self {
        Self {
            client,
            detector: EncodingDetector::default(),
            backups: None,
            data_dir: data_dir.into(),
            policy,
        }
    }

    /// Builds a fetcher from the directory, download and backup settings.
    pub fn from_config(config: &Config, client: Arc<dyn HttpClient>) -> Self {
        let policy = FetchPolicy {
            retry_count: config.download.retry_count,
            retry_delay: config.download.retry_delay_duration(),
        };
        let fetcher = Self::new(client, config.directories.data_path(), policy);

        if config.maintenance.enable_backup {
            fetcher.with_backups(BackupManager::new(config.directories.backup_path()))
        } else {
            fetcher
        }
    }

    pub fn with_backups(mut self, backups: BackupManager) -> Self {
        self.backups = Some(backups);
        self
    }

    /// Fetches `source` until it succeeds or the attempts run out.
    ///
    /// Network failures and unusable content are retried after the
    /// configured delay. Any other error ends the loop at once. Every failed
    /// attempt is logged.
    ///
    /// A URL that does not parse counts as a local error and is not retried.
    /// A source without `url` or `filename` fails without any request.
    #[instrument(skip(self, source), fields(source = %source.id))]
    pub async fn fetch(&self, source: &SourceDefinition) -> DownloadOutcome {
        if let Some(field) = source.missing_field() {
            let e = AppError::Config(format!("source `{}` has no `{}`", source.id, field));
            error!(name = %source.name, error = %e, "Download failed");
            return DownloadOutcome::failure(source, e.to_string());
        }

        let attempts = self.policy.attempts();
        info!(name = %source.name, url = %source.url, "Starting download");

        let mut attempt = 1;
        loop {
            match self.attempt(source).await {
                Ok(playlist) => {
                    info!(
                        name = %source.name,
                        file = %playlist.path.display(),
                        bytes = playlist.bytes,
                        channels = playlist.channels,
                        "Download succeeded"
                    );
                    return DownloadOutcome::success(source);
                }
                Err(e) if e.is_retryable() && attempt < attempts => {
                    warn!(
                        name = %source.name,
                        attempt,
                        attempts,
                        error = %e,
                        "Download attempt failed, retrying"
                    );
                    tokio::time::sleep(self.policy.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(name = %source.name, attempt, attempts, error = %e, "Download attempt failed");
                    error!(name = %source.name, error = %e, "Download failed");
                    return DownloadOutcome::failure(source, e.to_string());
                }
            }
        }
    }

    async fn attempt(&self, source: &SourceDefinition) -> Result<PersistedPlaylist> {
        let body = self.client.fetch(&source.url).await?;
        if body.is_empty() {
            return Err(AppError::Content(String::from("empty response body")));
        }

        let text = self.detector.decode(&body);
        if !is_valid_playlist(&text) {
            return Err(AppError::Content(String::from("not a valid M3U playlist")));
        }

        self.persist(source, &text).await
    }

    /// Replaces the stored playlist for `source` with `text`.
    ///
    /// The previous file, if any, is backed up first when backups are enabled.
    pub async fn persist(&self, source: &SourceDefinition, text: &str) -> Result<PersistedPlaylist> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let path = self.data_dir.join(&source.filename);

        let backup = match &self.backups {
            Some(backups) => backups.backup_if_exists(&path).await,
            None => None,
        };

        storage::write_atomic(&path, text.as_bytes()).await?;

        Ok(PersistedPlaylist {
            path,
            bytes: text.len(),
            channels: channel_count(text),
            backup,
        })
    }
}
