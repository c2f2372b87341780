//! Device access trait

use serde_json::Value;

use intent_model::PatchOperation;

use crate::Result;
use crate::patch::PatchRequest;

/// Blocking access to device configuration and state
///
/// Implementations must treat a missing resource on read as `Ok(None)`.
pub trait DeviceClient: Send + Sync {
    /// Configuration subtree at `path` (`content=config`)
    fn get_config(&self, device_id: &str, path: &str) -> Result<Option<Value>>;

    /// Operational state subtree at `path` (`content=nonconfig`)
    fn get_state(&self, device_id: &str, path: &str) -> Result<Option<Value>>;

    /// Apply every edit of `request` to one device
    fn patch(&self, device_id: &str, request: &PatchRequest) -> Result<()>;

    /// Remove the subtree at `path`
    ///
    /// Idempotent: removing an absent subtree succeeds.
    fn remove(&self, device_id: &str, path: &str) -> Result<()> {
        let mut request = PatchRequest::new();
        request.push_edit("remove", path, None, PatchOperation::Remove);
        self.patch(device_id, &request)
    }
}
