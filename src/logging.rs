//! Console and daily-rotated file logging for one run.

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{AppError, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log files are named `<prefix>.<YYYY-MM-DD>`.
pub const LOG_FILE_PREFIX: &str = "iptv_manager.log";

/// Keeps the file writer alive; dropping it flushes pending records.
#[must_use = "logs are flushed when the handle is dropped"]
pub struct LogHandle {
    _guard: WorkerGuard,
}

/// Maps a configured level name to a tracing directive.
///
/// Unknown names fall back to `info`.
pub fn level_directive(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" | "critical" | "fatal" => "error",
        _ => "info",
    }
}

/// Installs the global subscriber: console plus a daily file in `log_dir`.
///
/// `RUST_LOG` overrides the configured level when set.
pub fn init_logging(settings: &LoggingConfig, log_dir: &Path) -> Result<LogHandle> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,iptv_manager={}",
            level_directive(&settings.level)
        ))
    });
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match settings.format {
        LogFormat::Text => registry
            .with(fmt::layer())
            .with(fmt::layer().with_writer(writer).with_ansi(false))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json())
            .with(fmt::layer().json().with_writer(writer))
            .try_init(),
    };
    installed.map_err(|e| AppError::Logging(e.to_string()))?;

    Ok(LogHandle { _guard: guard })
}
