//! Error types for intent-core

use std::path::PathBuf;

/// Result type for intent-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in intent-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The cleanup ledger stored in the topology could not be decoded
    #[error("Cleanup ledger is corrupt: {message}")]
    LedgerCorrupt { message: String },

    /// Site objects could not be rendered
    #[error("Render failed: {message}")]
    Render { message: String },

    /// The approved-misalignment service rejected a request
    #[error("Misalignment resolver failed: {message}")]
    Resolver { message: String },

    /// Engine configuration could not be loaded
    #[error("Invalid configuration at {path}: {message}")]
    Config { path: PathBuf, message: String },

    // Transparent wrappers for underlying crate errors
    /// Comparison error from intent-compare
    #[error(transparent)]
    Compare(#[from] intent_compare::Error),

    /// Device access error from intent-restconf
    #[error(transparent)]
    Device(#[from] intent_restconf::DeviceError),

    /// Data model error from intent-model
    #[error(transparent)]
    Model(#[from] intent_model::Error),

    // Standard library and external crate errors
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    /// Render failure with a message
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }
}
