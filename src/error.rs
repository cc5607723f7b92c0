use std::io;
use thiserror::Error;

/// Error types for the application.
///
/// Covers the failure modes of a maintenance run:
/// - Configuration loading and validation
/// - Network requests and HTTP status codes
/// - Playlist content checks
/// - Backups, reports and local IO

/// Represents all possible errors that can occur in the application.
///
/// # Error Categories
///
/// - Config: fatal, aborts the run before any network activity
/// - Request / HttpStatus / Content: retryable per source
/// - UrlParse / Io: terminal for the source that hit them; a malformed URL
///   fails the same way on every attempt
/// - Backup / Report: logged, never change the outcome of a run
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Content error: {0}")]
    Content(String),

    #[error("Backup error: {0}")]
    Backup(String),

    #[error("Report error: {0}")]
    Report(String),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("{0}")]
    Custom(String),
}

impl AppError {
    /// Whether another download attempt may succeed after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::Request(_) | AppError::HttpStatus { .. } | AppError::Content(_)
        )
    }
}

impl From<&str> for AppError {
    fn from(error: &str) -> Self {
        AppError::Custom(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
