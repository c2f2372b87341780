//! [`FakeDevice`]: an in-memory network of devices.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use intent_model::PatchOperation;
use intent_restconf::{DeviceClient, DeviceError, PatchError, PatchRequest, Result};

/// Path-addressed subtrees of one device
type Store = BTreeMap<String, Value>;

#[derive(Debug)]
enum Failure {
    Patch(String),
    Status(u16),
}

impl Failure {
    fn into_error(self) -> DeviceError {
        match self {
            Failure::Patch(message) => DeviceError::Patch {
                errors: vec![PatchError::new(message, None)],
            },
            Failure::Status(status) => DeviceError::status(status),
        }
    }
}

#[derive(Debug, Default)]
struct Network {
    config: HashMap<String, Store>,
    state: HashMap<String, Store>,
    pending_failures: HashMap<String, VecDeque<Failure>>,
    unreachable: HashSet<String>,
    patches: Vec<(String, PatchRequest)>,
}

/// In-memory [`DeviceClient`] covering any number of devices.
///
/// Configuration is stored per device as `target path → subtree`. A patch is
/// applied atomically: either every edit lands or none does.
///
/// - `replace` stores the edit value at its target
/// - `merge` deep-merges objects into the stored value
/// - `remove` drops the target and everything below it; absent is fine
///
/// # Example
///
/// ```rust
/// use intent_restconf::{DeviceClient, PatchRequest};
/// use intent_model::PatchOperation;
/// use intent_test_utils::FakeDevice;
/// use serde_json::json;
///
/// let device = FakeDevice::new();
/// let mut request = PatchRequest::new();
/// request.push_edit("p1", "conf:/port=1", Some(json!({"mtu": 1500})), PatchOperation::Replace);
/// device.patch("ne-1", &request).unwrap();
///
/// assert_eq!(device.config("ne-1", "conf:/port=1"), Some(json!({"mtu": 1500})));
/// ```
#[derive(Debug, Default)]
pub struct FakeDevice {
    network: Mutex<Network>,
}

impl FakeDevice {
    /// Create a network with no devices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FakeDevice::set_config`].
    pub fn with_config(self, device_id: &str, path: &str, value: Value) -> Self {
        self.set_config(device_id, path, value);
        self
    }

    /// Builder form of [`FakeDevice::set_state`].
    pub fn with_state(self, device_id: &str, path: &str, value: Value) -> Self {
        self.set_state(device_id, path, value);
        self
    }

    /// Store a configuration subtree directly, bypassing patch semantics.
    pub fn set_config(&self, device_id: &str, path: &str, value: Value) {
        self.lock()
            .config
            .entry(device_id.to_string())
            .or_default()
            .insert(path.to_string(), value);
    }

    /// Store an operational state subtree.
    pub fn set_state(&self, device_id: &str, path: &str, value: Value) {
        self.lock()
            .state
            .entry(device_id.to_string())
            .or_default()
            .insert(path.to_string(), value);
    }

    /// Configuration currently stored at `path`.
    pub fn config(&self, device_id: &str, path: &str) -> Option<Value> {
        self.lock()
            .config
            .get(device_id)
            .and_then(|store| store.get(path))
            .cloned()
    }

    /// Paths configured on a device, in order.
    pub fn configured_paths(&self, device_id: &str) -> Vec<String> {
        self.lock()
            .config
            .get(device_id)
            .map(|store| store.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Make the next patch to `device_id` fail with a patch error.
    pub fn fail_next_patch(&self, device_id: &str, message: &str) {
        self.push_failure(device_id, Failure::Patch(message.to_string()));
    }

    /// Make the next patch to `device_id` fail with an HTTP status.
    pub fn fail_next_patch_with_status(&self, device_id: &str, status: u16) {
        self.push_failure(device_id, Failure::Status(status));
    }

    /// Make every call to `device_id` fail as unreachable, or undo that.
    pub fn set_unreachable(&self, device_id: &str, unreachable: bool) {
        let mut network = self.lock();
        if unreachable {
            network.unreachable.insert(device_id.to_string());
        } else {
            network.unreachable.remove(device_id);
        }
    }

    /// Every patch request received, failed ones included, in order.
    pub fn patches(&self) -> Vec<(String, PatchRequest)> {
        self.lock().patches.clone()
    }

    /// Patch requests received by one device.
    pub fn patches_for(&self, device_id: &str) -> Vec<PatchRequest> {
        self.lock()
            .patches
            .iter()
            .filter(|(device, _)| device == device_id)
            .map(|(_, request)| request.clone())
            .collect()
    }

    fn push_failure(&self, device_id: &str, failure: Failure) {
        self.lock()
            .pending_failures
            .entry(device_id.to_string())
            .or_default()
            .push_back(failure);
    }

    fn lock(&self) -> MutexGuard<'_, Network> {
        self.network.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self, device_id: &str, path: &str, state: bool) -> Result<Option<Value>> {
        let network = self.lock();
        check_reachable(&network, device_id)?;
        let stores = if state { &network.state } else { &network.config };
        Ok(stores
            .get(device_id)
            .and_then(|store| store.get(path))
            .cloned())
    }
}

impl DeviceClient for FakeDevice {
    fn get_config(&self, device_id: &str, path: &str) -> Result<Option<Value>> {
        self.read(device_id, path, false)
    }

    fn get_state(&self, device_id: &str, path: &str) -> Result<Option<Value>> {
        self.read(device_id, path, true)
    }

    fn patch(&self, device_id: &str, request: &PatchRequest) -> Result<()> {
        let mut network = self.lock();
        network
            .patches
            .push((device_id.to_string(), request.clone()));
        check_reachable(&network, device_id)?;

        if let Some(failure) = network
            .pending_failures
            .get_mut(device_id)
            .and_then(VecDeque::pop_front)
        {
            return Err(failure.into_error());
        }

        let mut store = network.config.get(device_id).cloned().unwrap_or_default();
        for edit in &request.edit {
            match edit.operation {
                PatchOperation::Remove => {
                    let below = format!("{}/", edit.target);
                    store.retain(|path, _| path != &edit.target && !path.starts_with(&below));
                }
                PatchOperation::Replace => {
                    let value = edit.value.clone().ok_or_else(|| missing_value(&edit.edit_id))?;
                    store.insert(edit.target.clone(), value);
                }
                PatchOperation::Merge => {
                    let value = edit.value.clone().ok_or_else(|| missing_value(&edit.edit_id))?;
                    match store.get_mut(&edit.target) {
                        Some(existing) => merge(existing, value),
                        None => {
                            store.insert(edit.target.clone(), value);
                        }
                    }
                }
            }
        }
        network.config.insert(device_id.to_string(), store);
        Ok(())
    }
}

fn check_reachable(network: &Network, device_id: &str) -> Result<()> {
    if network.unreachable.contains(device_id) {
        return Err(DeviceError::Connectivity {
            target: device_id.to_string(),
            message: "connection refused".to_string(),
        });
    }
    Ok(())
}

fn missing_value(edit_id: &str) -> DeviceError {
    DeviceError::Patch {
        errors: vec![PatchError::new(
            format!("edit {edit_id} has no value"),
            None,
        )],
    }
}

fn merge(existing: &mut Value, incoming: Value) {
    match (existing, incoming) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(&key) {
                    Some(current) => merge(current, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (existing, incoming) => *existing = incoming,
    }
}
