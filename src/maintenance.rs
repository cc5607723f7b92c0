use crate::backup::{remove_expired, BackupManager};
use crate::config::{Config, MaintenanceConfig};
use crate::logging::LOG_FILE_PREFIX;
use std::path::PathBuf;
use tracing::{debug, info};

/// Prefix of saved status reports in the log directory.
pub const REPORT_FILE_PREFIX: &str = "status_report_";

/// What a maintenance pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub backups: usize,
    pub logs: usize,
}

/// Start-of-run cleanup of expired backups and log files.
#[derive(Debug, Clone)]
pub struct Maintenance {
    backups: BackupManager,
    log_dir: PathBuf,
    settings: MaintenanceConfig,
}

impl Maintenance {
    pub fn new(backups: BackupManager, log_dir: impl Into<PathBuf>, settings: MaintenanceConfig) -> Self {
        Self {
            backups,
            log_dir: log_dir.into(),
            settings,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            BackupManager::new(config.directories.backup_path()),
            config.directories.log_path(),
            config.maintenance.clone(),
        )
    }

    /// Prunes backups and logs past their retention windows.
    ///
    /// Does nothing when cleanup is disabled.
    pub async fn run(&self) -> CleanupSummary {
        if !self.settings.enable_cleanup {
            debug!("Cleanup disabled");
            return CleanupSummary::default();
        }

        let backups = self.backups.prune(self.settings.backup_retention_days).await;
        let logs = remove_expired(&self.log_dir, self.settings.log_retention_days, |name| {
            name.starts_with(LOG_FILE_PREFIX) || name.starts_with(REPORT_FILE_PREFIX)
        })
        .await;
        if logs > 0 {
            info!(count = logs, "Removed expired log files");
        }

        CleanupSummary { backups, logs }
    }
}
