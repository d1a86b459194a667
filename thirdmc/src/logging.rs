//! Logging setup.
//!
//! Logs go to a daily rolling file under the data directory and, at
//! warning level and above, to stderr. `RUST_LOG` overrides the file filter.

use std::path::Path;

use thiserror::Error;
use time::macros::format_description;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

pub use tracing_appender::non_blocking::WorkerGuard;

/// Base name of the rolling log files.
pub const LOG_FILE_PREFIX: &str = "thirdmc.log";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to install log subscriber: {0}")]
    Init(String),
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive for
/// the life of the process.
pub fn init_logging(log_dir: &Path, verbose: bool) -> Result<WorkerGuard, LoggingError> {
    std::fs::create_dir_all(log_dir).map_err(|e| LoggingError::CreateDir {
        path: log_dir.display().to_string(),
        source: e,
    })?;

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let default_level = if verbose { "thirdmc=debug,info" } else { "info" };
    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let console_level = if verbose { "debug" } else { "warn" };

    let timer = LocalTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    ));

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_timer(timer.clone())
        .with_target(true)
        .with_filter(file_filter);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(timer)
        .with_target(false)
        .with_filter(EnvFilter::new(console_level));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    Ok(guard)
}
