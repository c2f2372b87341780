//! Error types for intent-model

/// Result type for intent-model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while interpreting model values
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A network state name that is not one of the known states
    #[error("Unknown network state: {0}")]
    UnknownNetworkState(String),

    /// A patch operation name that is not replace, merge or remove
    #[error("Unknown patch operation: {0}")]
    UnknownOperation(String),
}
