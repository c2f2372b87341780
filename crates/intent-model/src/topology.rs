//! Topology records owned by an intent
//!
//! The topology lists the device objects an intent believes it owns. Its
//! `extra-info` map carries opaque string state across reconciliation runs;
//! the engine keeps its cleanup ledger there.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A device object attributed to an intent
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyObject {
    /// Object name within the rendered site objects
    pub object_id: String,
    /// Device path of the object (RESTCONF target)
    pub device_path: String,
    /// Free-form category label
    pub category: String,
    /// Device the object lives on
    pub device_id: String,
}

/// Topology of an intent, replaced wholesale on every synchronize
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Topology {
    /// Objects currently attributed to the intent
    #[serde(default)]
    pub objects: Vec<TopologyObject>,
    /// Opaque string-keyed state persisted with the topology
    #[serde(default)]
    pub extra_info: BTreeMap<String, String>,
}

impl Topology {
    /// Objects attributed to a single device
    pub fn objects_for_device<'a>(
        &'a self,
        device_id: &'a str,
    ) -> impl Iterator<Item = &'a TopologyObject> + 'a {
        self.objects.iter().filter(move |o| o.device_id == device_id)
    }

    /// Replace the object set, keeping a stable order
    pub fn set_objects(&mut self, mut objects: Vec<TopologyObject>) {
        objects.sort();
        objects.dedup();
        self.objects = objects;
    }
}
