//! Error types for intent-restconf

use crate::patch::PatchError;

/// Result type for device and controller calls
pub type Result<T> = std::result::Result<T, DeviceError>;

/// Failures of a device or controller call
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The device or controller could not be reached
    #[error("{target} unreachable: {message}")]
    Connectivity { target: String, message: String },

    /// Non-success HTTP status without a structured error report
    #[error("{reason}")]
    HttpStatus { status: u16, reason: String },

    /// Structured RESTCONF / YANG-patch errors, global and per edit
    #[error("{}", format_patch_errors(.errors))]
    Patch { errors: Vec<PatchError> },

    /// A response body could not be decoded
    #[error("Invalid response: {message}")]
    Decode { message: String },
}

impl DeviceError {
    /// Error for an HTTP status, with the friendly reason where one exists
    pub fn status(status: u16) -> Self {
        Self::HttpStatus {
            status,
            reason: describe_status(status),
        }
    }

    /// `true` for failures reaching the remote side at all
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. })
    }
}

/// Friendly reason for an HTTP status
///
/// A small fixed set of statuses get a name; everything else is
/// `HTTP ERROR <status>`.
pub fn describe_status(status: u16) -> String {
    let reason = match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        other => return format!("HTTP ERROR {other}"),
    };
    reason.to_string()
}

fn format_patch_errors(errors: &[PatchError]) -> String {
    if errors.is_empty() {
        return "Patch failed".to_string();
    }
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
