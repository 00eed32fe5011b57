//! Logging setup.
//!
//! The terminal UI owns stdout/stderr while it runs, so in that mode events go to a log file
//! under the data directory. Prompt and one-shot modes log to stderr.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config;

const LOG_FILE_NAME: &str = "bfg-feedback.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogTarget {
    Stderr,
    File,
}

#[derive(Debug, Error)]
pub(crate) enum LoggingError {
    #[error("No suitable data directory available for logs: {0}")]
    NoDataDir(String),

    #[error("Failed to prepare log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(String),
}

/// Install the global subscriber. Returns the log file path when logging to a file.
pub(crate) fn init(target: LogTarget) -> Result<Option<PathBuf>, LoggingError> {
    let default_directive = match target {
        LogTarget::File => "bfg_feedback=info",
        LogTarget::Stderr => "bfg_feedback=warn",
    };
    let filter = build_env_filter(default_directive);

    match target {
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| LoggingError::SetGlobal(e.to_string()))?;
            Ok(None)
        }
        LogTarget::File => {
            let dir = config::log_dir().map_err(|e| LoggingError::NoDataDir(e.to_string()))?;
            fs::create_dir_all(&dir).map_err(|source| LoggingError::CreateDir {
                path: dir.clone(),
                source,
            })?;

            let path = dir.join(LOG_FILE_NAME);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|source| LoggingError::OpenFile {
                    path: path.clone(),
                    source,
                })?;

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| LoggingError::SetGlobal(e.to_string()))?;

            tracing::info!("Logging initialized; log file at {}", path.display());
            Ok(Some(path))
        }
    }
}

fn build_env_filter(default_directive: &str) -> EnvFilter {
    std::env::var("BFG_FEEDBACK_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive))
}
