//! Error types for intent-cli

use std::path::PathBuf;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from intent-core
    #[error(transparent)]
    Core(#[from] intent_core::Error),

    /// Error from intent-restconf
    #[error(transparent)]
    Device(#[from] intent_restconf::DeviceError),

    /// A JSON input file could not be read or decoded
    #[error("{path}: {message}")]
    Input { path: PathBuf, message: String },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Logging could not be initialised
    #[error("Logging setup failed: {0}")]
    Logging(String),

    /// Synchronize finished with device errors
    #[error("{message}")]
    SyncFailed { message: String },
}

impl CliError {
    /// Input error for `path`
    pub fn input(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Input {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
