//! Cleanup ledger
//!
//! The ledger records, per device, every object the engine successfully
//! applied with a `replace` operation, together with the rollback action for
//! it (always `remove`). It is the only state carried between reconciliation
//! runs and lives as a JSON string in the topology's extra info.
//!
//! A synchronize seeds its working set from the ledger so objects that are no
//! longer rendered get removed, and an audit reports ledger entries that were
//! not reasserted as undesired.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use intent_model::{ConfigBlock, PatchOperation, Topology, TopologyObject};

use crate::{Error, Result};

/// Extra-info key under which the ledger is persisted
pub const LEDGER_KEY: &str = "sitesCleanups";

/// Recorded rollback action for one object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupEntry {
    /// Device path of the object
    pub target: String,
    /// Operation that undoes the object
    pub operation: PatchOperation,
}

impl CleanupEntry {
    /// Rollback entry removing `target`
    pub fn remove(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            operation: PatchOperation::Remove,
        }
    }

    /// The entry as a config block ready for patching
    pub fn to_block(&self) -> ConfigBlock {
        ConfigBlock {
            target: self.target.clone(),
            value: None,
            operation: self.operation,
            ignore_children: Vec::new(),
        }
    }
}

/// Objects of one device keyed by object name
pub type DeviceEntries = BTreeMap<String, CleanupEntry>;

/// Per-device map of previously applied `replace` objects
///
/// Backed by ordered maps so the persisted JSON is byte-stable for an
/// unchanged ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CleanupLedger {
    devices: BTreeMap<String, DeviceEntries>,
}

impl CleanupLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the ledger stored in `topology`; empty when none is stored
    ///
    /// # Errors
    ///
    /// Returns [`Error::LedgerCorrupt`] when the stored string is not a valid
    /// ledger. A corrupt ledger is never silently replaced.
    pub fn restore(topology: &Topology) -> Result<Self> {
        match topology.extra_info.get(LEDGER_KEY) {
            None => Ok(Self::new()),
            Some(raw) if raw.trim().is_empty() => Ok(Self::new()),
            Some(raw) => serde_json::from_str(raw).map_err(|e| Error::LedgerCorrupt {
                message: e.to_string(),
            }),
        }
    }

    /// Encode the ledger into `topology`, replacing any previous value
    pub fn persist(&self, topology: &mut Topology) -> Result<()> {
        let encoded = serde_json::to_string(self)?;
        topology.extra_info.insert(LEDGER_KEY.to_string(), encoded);
        Ok(())
    }

    /// Entries of one device
    pub fn device(&self, device_id: &str) -> Option<&DeviceEntries> {
        self.devices.get(device_id)
    }

    /// Device identifiers with at least one entry
    pub fn device_ids(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    /// Every `(device, object, entry)` triple in order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &CleanupEntry)> {
        self.devices.iter().flat_map(|(device, objects)| {
            objects
                .iter()
                .map(move |(name, entry)| (device.as_str(), name.as_str(), entry))
        })
    }

    /// Record a rollback entry for one object
    pub fn record(&mut self, device_id: &str, object: &str, entry: CleanupEntry) {
        self.devices
            .entry(device_id.to_string())
            .or_default()
            .insert(object.to_string(), entry);
    }

    /// Replace everything known about a device; an empty set drops it
    pub fn replace_device(&mut self, device_id: &str, entries: DeviceEntries) {
        if entries.is_empty() {
            self.devices.remove(device_id);
        } else {
            self.devices.insert(device_id.to_string(), entries);
        }
    }

    /// Forget one object, dropping the device once it has no entries left
    pub fn remove_entry(&mut self, device_id: &str, object: &str) -> Option<CleanupEntry> {
        let objects = self.devices.get_mut(device_id)?;
        let removed = objects.remove(object);
        if objects.is_empty() {
            self.devices.remove(device_id);
        }
        removed
    }

    /// `true` when no device has entries
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Number of recorded objects across all devices
    pub fn len(&self) -> usize {
        self.devices.values().map(BTreeMap::len).sum()
    }

    /// Topology objects for every recorded entry
    pub fn topology_objects(&self, category: &str) -> Vec<TopologyObject> {
        self.entries()
            .map(|(device, name, entry)| TopologyObject {
                object_id: name.to_string(),
                device_path: entry.target.clone(),
                category: category.to_string(),
                device_id: device.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> CleanupLedger {
        let mut ledger = CleanupLedger::new();
        ledger.record("ne-b", "port-2", CleanupEntry::remove("conf:/port=2"));
        ledger.record("ne-a", "port-1", CleanupEntry::remove("conf:/port=1"));
        ledger
    }

    #[test]
    fn restore_without_stored_ledger_is_empty() {
        let ledger = CleanupLedger::restore(&Topology::default()).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn persist_then_restore_preserves_entries() {
        let mut topology = Topology::default();
        sample().persist(&mut topology).unwrap();

        assert_eq!(
            topology.extra_info[LEDGER_KEY],
            r#"{"ne-a":{"port-1":{"target":"conf:/port=1","operation":"remove"}},"ne-b":{"port-2":{"target":"conf:/port=2","operation":"remove"}}}"#
        );
        assert_eq!(CleanupLedger::restore(&topology).unwrap(), sample());
    }

    #[test]
    fn persist_always_writes_even_when_empty() {
        let mut topology = Topology::default();
        CleanupLedger::new().persist(&mut topology).unwrap();
        assert_eq!(topology.extra_info[LEDGER_KEY], "{}");
    }

    #[test]
    fn corrupt_ledger_is_an_error() {
        let mut topology = Topology::default();
        topology
            .extra_info
            .insert(LEDGER_KEY.to_string(), "{not json".to_string());

        assert!(matches!(
            CleanupLedger::restore(&topology),
            Err(Error::LedgerCorrupt { .. })
        ));
    }

    #[test]
    fn removing_last_entry_drops_device() {
        let mut ledger = sample();
        assert_eq!(
            ledger.remove_entry("ne-a", "port-1"),
            Some(CleanupEntry::remove("conf:/port=1"))
        );
        assert_eq!(ledger.device_ids().collect::<Vec<_>>(), vec!["ne-b"]);
        assert_eq!(ledger.remove_entry("ne-a", "port-1"), None);
    }

    #[test]
    fn replace_device_with_nothing_drops_it() {
        let mut ledger = sample();
        ledger.replace_device("ne-b", DeviceEntries::new());
        assert_eq!(ledger.len(), 1);
        assert!(ledger.device("ne-b").is_none());
    }

    #[test]
    fn topology_objects_follow_entries() {
        let objects = sample().topology_objects("device-config");
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].device_id, "ne-a");
        assert_eq!(objects[0].object_id, "port-1");
        assert_eq!(objects[0].device_path, "conf:/port=1");
        assert_eq!(objects[1].category, "device-config");
    }
}
