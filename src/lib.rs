//! Scheduled maintenance of IPTV playlists.
//!
//! This library downloads M3U playlists from a small set of configured
//! sources, validates them, keeps timestamped backups of the files it
//! replaces and reports the result of each run.
//!
//! # Architecture
//!
//! The application is structured into several key components:
//! - `ConfigStore`: Configuration loading, merging and validation
//! - `EncodingDetector`: Text encoding detection for downloaded bodies
//! - `validation`: Structural playlist checks
//! - `BackupManager`: Backups before overwrite and retention pruning
//! - `SourceFetcher`: Per-source download with retries
//! - `DownloadCoordinator`: Bounded concurrent download of all sources
//! - `ReportBuilder`: Human readable status reports
//! - `IptvManager`: The run and status entry points
//!
//! # Example
//! ```no_run
//! use iptv_manager::{ConfigStore, IptvManager};
//!
//! async fn example() {
//!     let store = ConfigStore::load("config.json").unwrap();
//!     let manager = IptvManager::new(store).unwrap();
//!     println!("{}", manager.status());
//! }
//! ```

pub mod backup;
pub mod config;
pub mod downloader;
pub mod encoding;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod logging;
pub mod maintenance;
pub mod manager;
pub mod models;
pub mod report;
pub mod storage;
pub mod validation;

// Re-export commonly used items
pub use backup::BackupManager;
pub use config::{Config, ConfigStore};
pub use downloader::DownloadCoordinator;
pub use encoding::EncodingDetector;
pub use error::AppError;
pub use fetcher::{FetchPolicy, SourceFetcher};
pub use http::ReqwestClient;
pub use manager::IptvManager;
pub use models::{DownloadOutcome, DownloadResults, SourceDefinition};
pub use report::ReportBuilder;
