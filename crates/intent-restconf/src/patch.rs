//! YANG patch (RFC 8072) request envelope and error report parsing

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use intent_model::PatchOperation;

/// Member name wrapping a patch request body
pub const PATCH_ENVELOPE: &str = "ietf-yang-patch:yang-patch";

/// Member name wrapping a patch status response
pub const PATCH_STATUS_ENVELOPE: &str = "ietf-yang-patch:yang-patch-status";

/// Member name wrapping a generic RESTCONF error report
pub const RESTCONF_ERRORS: &str = "ietf-restconf:errors";

/// One edit of a patch request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PatchEdit {
    /// Edit identifier, unique within the request
    pub edit_id: String,
    /// Device path the edit applies to
    pub target: String,
    /// Subtree value; absent for `remove`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Edit operation
    pub operation: PatchOperation,
}

/// A patch request applying several edits to one device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PatchRequest {
    /// Request identifier
    pub patch_id: String,
    /// Edits, applied in order
    pub edit: Vec<PatchEdit>,
}

impl PatchRequest {
    /// An empty request with a fresh UUID as its identifier
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// An empty request with a given identifier
    pub fn with_id(patch_id: impl Into<String>) -> Self {
        Self {
            patch_id: patch_id.into(),
            edit: Vec::new(),
        }
    }

    /// Append an edit
    pub fn push_edit(
        &mut self,
        edit_id: impl Into<String>,
        target: impl Into<String>,
        value: Option<Value>,
        operation: PatchOperation,
    ) {
        self.edit.push(PatchEdit {
            edit_id: edit_id.into(),
            target: target.into(),
            value,
            operation,
        });
    }

    /// `true` when there is nothing to apply
    pub fn is_empty(&self) -> bool {
        self.edit.is_empty()
    }

    /// Wire body: the request wrapped in its envelope member
    pub fn to_body(&self) -> Value {
        json!({ PATCH_ENVELOPE: self })
    }
}

impl Default for PatchRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// One error reported by the device or controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PatchError {
    /// Human-readable message
    pub error_message: String,
    /// Offending path, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_path: Option<String>,
}

impl PatchError {
    /// Build an error entry
    pub fn new(message: impl Into<String>, path: Option<String>) -> Self {
        Self {
            error_message: message.into(),
            error_path: path,
        }
    }
}

impl fmt::Display for PatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_path {
            Some(path) => write!(f, "{} ({})", self.error_message, path),
            None => write!(f, "{}", self.error_message),
        }
    }
}

/// Every error entry in a response body
///
/// Collects the global error list and each edit's error list of a patch
/// status report, as well as a plain RESTCONF error report. An empty result
/// means the body carries no structured errors.
pub fn parse_patch_errors(body: &Value) -> Vec<PatchError> {
    let mut errors = Vec::new();

    if let Some(status) = body.get(PATCH_STATUS_ENVELOPE) {
        collect_error_list(status.get("errors"), &mut errors);
        if let Some(edits) = status
            .pointer("/edit-status/edit")
            .and_then(Value::as_array)
        {
            for edit in edits {
                collect_error_list(edit.get("errors"), &mut errors);
            }
        }
    }

    collect_error_list(body.get(RESTCONF_ERRORS), &mut errors);
    errors
}

fn collect_error_list(errors: Option<&Value>, out: &mut Vec<PatchError>) {
    let Some(list) = errors.and_then(|e| e.get("error")).and_then(Value::as_array) else {
        return;
    };
    for entry in list {
        let message = entry
            .get("error-message")
            .and_then(Value::as_str)
            .or_else(|| entry.get("error-tag").and_then(Value::as_str))
            .unwrap_or("unknown error");
        let path = entry
            .get("error-path")
            .and_then(Value::as_str)
            .map(str::to_string);
        out.push(PatchError::new(message, path));
    }
}
