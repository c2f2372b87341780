//! Intent type for declarative desired state
//!
//! An intent is the desired configuration of one target across one or more
//! devices. The engine never owns intents: the hosting controller loads one,
//! hands it to a synchronize or audit call, and stores the returned topology.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::topology::Topology;

/// Desired lifecycle state of an intent on the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkState {
    /// Configuration should be present and match the intent
    Active,
    /// Configuration should be withdrawn but the intent kept
    Suspend,
    /// Configuration should be withdrawn and the intent released
    Delete,
    /// Controller-specific state the engine does not act on
    Custom,
}

impl fmt::Display for NetworkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Suspend => write!(f, "suspend"),
            Self::Delete => write!(f, "delete"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

impl FromStr for NetworkState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "suspend" => Ok(Self::Suspend),
            "delete" => Ok(Self::Delete),
            "custom" => Ok(Self::Custom),
            other => Err(Error::UnknownNetworkState(other.to_string())),
        }
    }
}

/// A declarative desired-state record for one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Intent {
    /// Unique identifier of this intent instance
    pub target: String,
    /// Intent-type name (e.g., "port-ethernet")
    pub intent_type: String,
    /// Intent-type version
    #[serde(default = "default_version")]
    pub intent_type_version: u32,
    /// Desired network state
    pub network_state: NetworkState,
    /// Intent configuration document (a YANG instance document)
    #[serde(default)]
    pub config: Value,
    /// Topology owned by this intent
    #[serde(default)]
    pub topology: Topology,
}

fn default_version() -> u32 {
    1
}

impl Intent {
    /// Create an intent with an empty configuration and topology
    pub fn new(
        target: impl Into<String>,
        intent_type: impl Into<String>,
        network_state: NetworkState,
    ) -> Self {
        Self {
            target: target.into(),
            intent_type: intent_type.into(),
            intent_type_version: default_version(),
            network_state,
            config: Value::Object(Default::default()),
            topology: Topology::default(),
        }
    }

    /// Replace the configuration document
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    /// Replace the topology
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }
}
