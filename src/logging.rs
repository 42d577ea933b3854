// Tracing subscriber setup: stdout plus an optional non-blocking log file
use std::path::{Path, PathBuf};

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;

use crate::config::LoggingSettings;
use crate::error::{AccessError, Result};

/// Unknown levels fall back to `info`
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "off" => LevelFilter::OFF,
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    }
}

/// Log file location, `None` when file logging is switched off
pub fn log_file_path(settings: &LoggingSettings, default_dir: &Path) -> Option<PathBuf> {
    let file_name = settings.file_name.as_ref().filter(|name| !name.is_empty())?;
    let dir = settings.dir.clone().unwrap_or_else(|| default_dir.to_path_buf());
    Some(dir.join(file_name))
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must live as long as the process.
pub fn init(settings: &LoggingSettings, default_dir: &Path) -> Result<Option<WorkerGuard>> {
    let level = parse_level(&settings.level);

    let (file_layer, guard) = match log_file_path(settings, default_dir) {
        Some(path) => {
            let dir = path.parent().unwrap_or(default_dir);
            std::fs::create_dir_all(dir).map_err(|e| {
                AccessError::ConfigError(format!("Failed to create log directory {:?}: {}", dir, e))
            })?;

            let file_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
            let file_appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(level);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(fmt::layer().with_filter(level))
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AccessError::ConfigError(format!("Failed to set tracing subscriber: {}", e)))?;

    Ok(guard)
}
