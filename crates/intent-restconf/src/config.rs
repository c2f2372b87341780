//! Connection settings for the controller services

use serde::{Deserialize, Serialize};

/// Default mount of a device's configuration root under the RESTCONF base
pub const DEFAULT_DEVICE_ROOT: &str =
    "data/network-device-mgr:network-devices/network-device={device}/root";

/// RESTCONF device access settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestconfConfig {
    /// RESTCONF base URL (e.g., `https://controller:8545/restconf`)
    pub base_url: String,
    /// Device mount template relative to `base_url`; `{device}` is replaced
    pub device_root: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Accept self-signed controller certificates
    pub accept_invalid_certs: bool,
}

impl Default for RestconfConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:8545/restconf".to_string(),
            device_root: DEFAULT_DEVICE_ROOT.to_string(),
            timeout_secs: 30,
            accept_invalid_certs: false,
        }
    }
}

/// Schema metadata service settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Base URL of the list-key lookup service; lookups disabled when absent
    pub base_url: Option<String>,
}

/// Approved-misalignment service settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Endpoint filtering desired configuration before a synchronize
    pub synchronize_url: Option<String>,
    /// Endpoint filtering an audit report
    pub audit_url: Option<String>,
}

impl ResolverConfig {
    /// `true` when both endpoints are configured
    pub fn is_configured(&self) -> bool {
        self.synchronize_url.is_some() && self.audit_url.is_some()
    }
}
