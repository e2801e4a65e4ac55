//! Structured logging infrastructure for Harry.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::error::{HarryError, Result};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, colored output for local development.
    #[default]
    Pretty,
    /// Single-line human readable output.
    Compact,
    /// One JSON object per line.
    Json,
}

/// Configuration for the logging system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "harry_fun=trace").
    pub level: String,
    /// Line format.
    pub format: LogFormat,
    /// Optional directory for a daily rotating log file.
    pub directory: Option<String>,
    /// Whether to include target module information.
    pub include_targets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            directory: None,
            include_targets: true,
        }
    }
}

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.level` when set. When a log directory is
/// configured a second, ANSI-free layer writes to `harry.log` rotated daily;
/// the returned guard must be kept alive for those writes to be flushed.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| HarryError::config_with_source("invalid log level filter", e))?;

    let console = match config.format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(config.include_targets)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(config.include_targets)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(config.include_targets)
            .boxed(),
    };

    let (file_layer, guard) = match config.directory.as_deref() {
        Some(directory) => {
            let (writer, guard) = file_writer(Path::new(directory));
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(config.include_targets)
                .with_writer(writer)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| HarryError::internal(format!("failed to install tracing subscriber: {e}")))?;

    Ok(guard)
}

fn file_writer(directory: &Path) -> (tracing_appender::non_blocking::NonBlocking, WorkerGuard) {
    let appender = tracing_appender::rolling::daily(directory, "harry.log");
    tracing_appender::non_blocking(appender)
}
