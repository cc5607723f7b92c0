use crate::error::{AppError, Result};
use crate::models::DownloadResults;
use crate::validation::channel_count;
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{error, info};

const RULE_WIDTH: usize = 50;
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders run outcomes and the state of the data directory as plain text.
///
/// # Fields
/// * `data_dir` - Directory scanned for playlist files
/// * `log_dir` - Directory that receives saved reports
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl ReportBuilder {
    pub fn new(data_dir: impl Into<PathBuf>, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            log_dir: log_dir.into(),
        }
    }

    pub fn build(&self, results: &DownloadResults) -> String {
        self.render(results, Local::now())
    }

    /// Renders the report as of `generated_at`.
    ///
    /// Summary and per-source sections are omitted when `results` is empty.
    pub fn render(&self, results: &DownloadResults, generated_at: DateTime<Local>) -> String {
        let mut lines = vec![
            String::from("IPTV Playlist Status Report"),
            "=".repeat(RULE_WIDTH),
            format!("Generated: {}", generated_at.format(TIME_FORMAT)),
            String::new(),
        ];

        if !results.is_empty() {
            lines.push(String::from("Download summary:"));
            lines.push(format!("  Total: {} sources", results.len()));
            lines.push(format!("  Succeeded: {}", results.success_count()));
            lines.push(format!("  Failed: {}", results.failure_count()));
            lines.push(String::new());

            lines.push(String::from("Details:"));
            for outcome in results.iter() {
                let status = if outcome.success {
                    String::from("OK")
                } else {
                    format!("FAILED: {}", outcome.error)
                };
                lines.push(format!("  {}: {}", outcome.name, status));
            }
            lines.push(String::new());
        }

        if self.data_dir.is_dir() {
            lines.push(String::from("Files:"));
            for path in playlist_files(&self.data_dir) {
                lines.push(describe_file(&path));
            }
        }

        lines.join("\n")
    }

    /// Writes a freshly built report to `status_report_<timestamp>.txt` in the
    /// log directory.
    ///
    /// Failures are logged and reported as `None`.
    pub async fn save(&self, results: &DownloadResults) -> Option<PathBuf> {
        let now = Local::now();
        let content = self.render(results, now);
        let path = self
            .log_dir
            .join(format!("status_report_{}.txt", now.format("%Y%m%d_%H%M%S")));

        match write_report(&path, &content).await {
            Ok(()) => {
                info!(path = %path.display(), "Status report saved");
                Some(path)
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to save status report");
                None
            }
        }
    }
}

async fn write_report(path: &Path, content: &str) -> Result<()> {
    tokio::fs::write(path, content)
        .await
        .map_err(|e| AppError::Report(e.to_string()))
}

fn is_playlist(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| {
                ext.eq_ignore_ascii_case("m3u") || ext.eq_ignore_ascii_case("m3u8")
            })
}

/// Playlist files in `dir`, sorted by name.
fn playlist_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_playlist(path))
            .collect(),
        Err(_) => Vec::new(),
    };
    files.sort();
    files
}

fn describe_file(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let summary = std::fs::metadata(path).and_then(|meta| {
        let modified: DateTime<Local> = meta.modified()?.into();
        let bytes = std::fs::read(path)?;
        Ok((meta.len(), channel_count(&String::from_utf8_lossy(&bytes)), modified))
    });

    let mut line = String::new();
    match summary {
        Ok((size, channels, modified)) => {
            let _ = write!(
                line,
                "  {}: {} bytes, {} channels, updated {}",
                name,
                size,
                channels,
                modified.format(TIME_FORMAT)
            );
        }
        Err(e) => {
            let _ = write!(line, "  {}: unreadable - {}", name, e);
        }
    }
    line
}
