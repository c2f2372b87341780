//! Error types for intent-compare

/// Result type for intent-compare operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while comparing intended and actual state
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A health assertion names an operator that does not exist
    #[error("Unsupported state check: {check}")]
    UnsupportedCheck { check: String },

    /// A `regex` assertion carries a pattern that does not compile
    #[error("Invalid pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A path query could not be parsed
    #[error("Invalid path query {query:?}: {message}")]
    InvalidQuery { query: String, message: String },

    /// The schema source could not resolve list keys
    #[error("Key lookup failed for {path}: {message}")]
    KeyLookup { path: String, message: String },
}
