//! File logging bootstrap.
//!
//! Installs a global `tracing` subscriber writing plain-text events to
//! [`CalculatorConfig::log_file`]. Initialization never panics; a second
//! call reports [`LoggingError::AlreadyInitialized`].

use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::CalculatorConfig;

const DEFAULT_FILTER: &str = "info";

/// Failures while installing file logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log directory could not be created.
    #[error("failed to create log directory `{}`: {source}", path.display())]
    CreateDir {
        /// Directory that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The configured log file has no file name component.
    #[error("log file path `{}` has no file name", .0.display())]
    InvalidPath(PathBuf),
    /// Another global subscriber is already installed.
    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
}

/// Starts file logging; keep the returned guard alive to flush on exit.
///
/// `RUST_LOG` overrides the default `info` filter.
pub fn init_logging(config: &CalculatorConfig) -> Result<WorkerGuard, LoggingError> {
    let log_file = config.log_file();
    let dir = log_file
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = log_file
        .file_name()
        .ok_or_else(|| LoggingError::InvalidPath(log_file.clone()))?;

    std::fs::create_dir_all(&dir).map_err(|source| LoggingError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    let appender = tracing_appender::rolling::never(&dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    tracing::info!(log_file = %log_file.display(), "logging initialized");
    Ok(guard)
}
