//! Configuration management for the application.
//!
//! Provides centralized configuration options for controlling:
//! - Playlist sources
//! - Directory layout
//! - Download limits and retries
//! - Retention of backups and logs
//! - Log level and format

use crate::error::{AppError, Result};
use crate::models::SourceDefinition;
use crate::storage;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Top-level sections that must survive merging for a configuration to load.
pub const REQUIRED_SECTIONS: [&str; 3] = ["sources", "directories", "download"];

/// Configuration for the playlist manager.
///
/// # Examples
///
/// ```
/// use iptv_manager::Config;
///
/// let config = Config::default();
/// assert!(config.download.max_workers > 0);
/// assert!(config.directories.base_dir.is_absolute());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub sources: BTreeMap<String, SourceConfig>,
    pub directories: DirectoriesConfig,
    pub download: DownloadConfig,
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoriesConfig {
    pub base_dir: PathBuf,
    pub data_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl DirectoriesConfig {
    pub fn data_path(&self) -> PathBuf {
        self.base_dir.join(&self.data_dir)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.base_dir.join(&self.backup_dir)
    }

    pub fn log_path(&self) -> PathBuf {
        self.base_dir.join(&self.log_dir)
    }

    /// Creates the base, data, backup and log directories if missing.
    pub fn create_all(&self) -> std::io::Result<()> {
        for dir in [
            self.base_dir.clone(),
            self.data_path(),
            self.backup_path(),
            self.log_path(),
        ] {
            std::fs::create_dir_all(&dir)?;
            debug!(dir = %dir.display(), "Directory ready");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Per-request timeout in seconds.
    pub timeout: u64,
    pub retry_count: u32,
    /// Pause between attempts in seconds.
    pub retry_delay: u64,
    pub max_workers: usize,
    pub user_agent: String,
}

impl DownloadConfig {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn retry_delay_duration(&self) -> Duration {
        Duration::from_secs(self.retry_delay)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    pub backup_retention_days: u64,
    pub log_retention_days: u64,
    pub enable_backup: bool,
    pub enable_cleanup: bool,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            backup_retention_days: 7,
            log_retention_days: 30,
            enable_backup: true,
            enable_cleanup: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("INFO"),
            format: LogFormat::Text,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut sources = BTreeMap::new();
        sources.insert(
            String::from("domestic"),
            SourceConfig {
                name: Some(String::from("Domestic")),
                url: Some(String::from("https://live.hacks.tools/tv/iptv4.m3u")),
                filename: Some(String::from("domestic.m3u")),
                enabled: true,
            },
        );
        sources.insert(
            String::from("international"),
            SourceConfig {
                name: Some(String::from("International")),
                url: Some(String::from("https://live.hacks.tools/iptv/index.m3u")),
                filename: Some(String::from("international.m3u")),
                enabled: true,
            },
        );

        Self {
            sources,
            directories: DirectoriesConfig {
                base_dir: PathBuf::from("/data/media/iptv"),
                data_dir: PathBuf::from("data"),
                backup_dir: PathBuf::from("backup"),
                log_dir: PathBuf::from("logs"),
            },
            download: DownloadConfig {
                timeout: 30,
                retry_count: 3,
                retry_delay: 5,
                max_workers: 4,
                user_agent: String::from("IPTV-Manager/1.0"),
            },
            maintenance: MaintenanceConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Enabled sources in a stable order (sorted by id).
    ///
    /// An entry without `url` or `filename` is still returned, with the field
    /// left empty, so that the run reports it as a failed source.
    pub fn enabled_sources(&self) -> Vec<SourceDefinition> {
        self.sources
            .iter()
            .filter(|(_, source)| source.enabled)
            .map(|(id, source)| SourceDefinition {
                id: id.clone(),
                name: source.name.clone().unwrap_or_else(|| id.clone()),
                url: source.url.clone().unwrap_or_default(),
                filename: source.filename.clone().unwrap_or_default(),
            })
            .collect()
    }
}

/// Overlays `user` onto `base`.
///
/// Objects present on both sides merge key by key; any other user value
/// replaces the base value outright. Keys only the user defines are kept.
pub fn merge(base: &mut Value, user: Value) {
    match (base, user) {
        (Value::Object(base), Value::Object(user)) => {
            for (key, value) in user {
                let nested = value.is_object() && base.get(&key).map_or(false, Value::is_object);
                match base.get_mut(&key) {
                    Some(existing) if nested => merge(existing, value),
                    _ => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, user) => *base = user,
    }
}

/// What happened to the configuration file while it was loaded.
///
/// Loading usually runs before logging is installed, so these are kept on
/// the store and written out by [`ConfigStore::log_load_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    Loaded,
    CreatedDefaults,
    DefaultsNotSaved(String),
    FellBackToDefaults(String),
}

/// Loaded configuration plus the merged JSON document it came from.
///
/// The document keeps keys the typed view does not know about.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    document: Value,
    config: Config,
    events: Vec<LoadEvent>,
}

impl ConfigStore {
    /// Loads `path`, overlaying it on the built-in defaults.
    ///
    /// A missing file is created with the defaults. An unreadable or
    /// malformed file is ignored with a warning.
    ///
    /// # Errors
    /// * `AppError::Config` if a required section is absent after merging,
    ///   a section has the wrong shape, or `base_dir` is not absolute
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut document = serde_json::to_value(Config::default())?;

        let event = if path.exists() {
            match read_document(&path) {
                Ok(user) => {
                    merge(&mut document, user);
                    LoadEvent::Loaded
                }
                Err(e) => LoadEvent::FellBackToDefaults(e.to_string()),
            }
        } else {
            match write_document(&path, &document) {
                Ok(()) => LoadEvent::CreatedDefaults,
                Err(e) => LoadEvent::DefaultsNotSaved(e.to_string()),
            }
        };

        let config = validate(&document)?;
        Ok(Self {
            path,
            document,
            config,
            events: vec![event],
        })
    }

    pub fn load_events(&self) -> &[LoadEvent] {
        &self.events
    }

    /// Writes the load events to the current tracing subscriber.
    pub fn log_load_events(&self) {
        let path = self.path.display();
        for event in &self.events {
            match event {
                LoadEvent::Loaded => info!(path = %path, "Configuration loaded"),
                LoadEvent::CreatedDefaults => {
                    info!(path = %path, "Created default configuration file")
                }
                LoadEvent::DefaultsNotSaved(e) => {
                    error!(path = %path, error = %e, "Failed to save default configuration")
                }
                LoadEvent::FellBackToDefaults(e) => {
                    warn!(path = %path, error = %e, "Failed to load configuration, using defaults")
                }
            }
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn enabled_sources(&self) -> Vec<SourceDefinition> {
        self.config.enabled_sources()
    }
}

fn read_document(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&text)?;
    if !value.is_object() {
        return Err(AppError::Config(String::from(
            "top-level value must be a JSON object",
        )));
    }
    Ok(value)
}

fn write_document(path: &Path, document: &Value) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(document)?;
    storage::write_atomic_sync(path, text.as_bytes())?;

    let written: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    if &written != document {
        return Err(AppError::Config(format!(
            "{} does not read back as written",
            path.display()
        )));
    }
    Ok(())
}

fn validate(document: &Value) -> Result<Config> {
    for section in REQUIRED_SECTIONS {
        if document.get(section).map_or(true, Value::is_null) {
            return Err(AppError::Config(format!(
                "missing required section `{}`",
                section
            )));
        }
    }

    let mut typed = document.clone();
    if let Some(sources) = typed.get_mut("sources").and_then(Value::as_object_mut) {
        sources.retain(|_, source| source.get("enabled") != Some(&Value::Bool(false)));
    }

    let config: Config = serde_json::from_value(typed)
        .map_err(|e| AppError::Config(format!("invalid configuration: {}", e)))?;

    if !config.directories.base_dir.is_absolute() {
        return Err(AppError::Config(format!(
            "base_dir must be an absolute path, got {}",
            config.directories.base_dir.display()
        )));
    }

    Ok(config)
}
