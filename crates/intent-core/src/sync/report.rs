//! Synchronize results

use serde::{Deserialize, Serialize};

use intent_model::Topology;

/// Report from a synchronize call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Whether every device was synchronized
    pub success: bool,
    /// Actions taken during the call
    pub actions: Vec<String>,
    /// Per-device errors, each prefixed with `[device: <id>]`
    pub errors: Vec<String>,
}

impl SyncReport {
    /// Create a successful sync report
    pub fn success() -> Self {
        Self {
            success: true,
            actions: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Record an action taken during the call
    pub fn push_action(&mut self, action: String) {
        self.actions.push(action);
    }

    /// Record an error, marking the report failed
    pub fn push_error(&mut self, error: String) {
        self.success = false;
        self.errors.push(error);
    }

    /// All errors joined into one message; `None` on success
    pub fn error_message(&self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.join("; "))
        }
    }
}

impl Default for SyncReport {
    fn default() -> Self {
        Self::success()
    }
}

/// Topology and report produced by a synchronize call
///
/// The topology always carries the persisted ledger, including after a
/// failure, and must be stored back on the intent by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// Updated topology
    pub topology: Topology,
    /// Outcome details
    pub report: SyncReport,
}
