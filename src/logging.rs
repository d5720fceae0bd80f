use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Overrides `log_level` from the config file, e.g. `TASKDECK_LOG=debug`
pub const LOG_ENV_VAR: &str = "TASKDECK_LOG";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to open log file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid log filter '{0}'")]
    Filter(String),
    #[error("Failed to install log subscriber: {0}")]
    Init(String),
}

fn build_filter(default_level: &str) -> Result<EnvFilter, LoggingError> {
    match std::env::var(LOG_ENV_VAR) {
        Ok(directives) if !directives.trim().is_empty() => {
            EnvFilter::try_new(&directives).map_err(|_| LoggingError::Filter(directives))
        }
        _ => EnvFilter::try_new(default_level).map_err(|_| LoggingError::Filter(default_level.to_string())),
    }
}

/// Send tracing output to `log_path`. The terminal belongs to the TUI, so nothing goes to stdout.
pub fn init_logging(log_path: &Path, default_level: &str) -> Result<(), LoggingError> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(log_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(default_level)?)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))
}
