//! Builders for intents, site objects and key resolvers.
//!
//! The port fixtures model an SR OS style device tree:
//! `nokia-conf:/configure/port=<id>` holding `{"nokia-conf:port": [{...}]}`.

use std::sync::Arc;

use serde_json::{Value, json};

use intent_compare::{ConfigComparator, KeyCache, ListKeyResolver, StaticKeySource};
use intent_model::{ConfigBlock, Intent, NetworkState, SiteObject, SiteObjects};

/// Intent type used by the port fixtures.
pub const PORT_INTENT: &str = "port-ethernet";

/// An intent for `target` in `state` with an empty topology.
pub fn port_intent(target: &str, state: NetworkState) -> Intent {
    Intent::new(target, PORT_INTENT, state).with_config(json!({"port-ethernet:port-ethernet": {}}))
}

/// Device path of a port.
pub fn port_path(port_id: &str) -> String {
    format!("nokia-conf:/configure/port={}", port_id.replace('/', "%2F"))
}

/// Port subtree as the device returns it.
pub fn port_config(port_id: &str, mtu: u64) -> Value {
    json!({
        "nokia-conf:port": [{
            "port-id": port_id,
            "admin-state": "enable",
            "ethernet": {"mtu": mtu}
        }]
    })
}

/// A `replace` site object for a port.
pub fn port_object(port_id: &str, mtu: u64) -> SiteObject {
    SiteObject::config(ConfigBlock::replace(port_path(port_id), port_config(port_id, mtu)))
}

/// Site objects from `(name, object)` pairs.
pub fn site_objects<I, S>(objects: I) -> SiteObjects
where
    I: IntoIterator<Item = (S, SiteObject)>,
    S: Into<String>,
{
    objects
        .into_iter()
        .map(|(name, object)| (name.into(), object))
        .collect()
}

/// A comparator keyed from `lists` with a private cache.
///
/// Each entry maps a list path to its key names.
pub fn comparator(lists: &[(&str, &[&str])]) -> ConfigComparator {
    let source = lists
        .iter()
        .fold(StaticKeySource::new(), |source, (path, keys)| {
            source.with_list(path, keys.iter().copied())
        });
    ConfigComparator::new(ListKeyResolver::with_cache(Arc::new(source), KeyCache::new()))
}
