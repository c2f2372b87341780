//! Engine configuration loaded from TOML
//!
//! ```toml
//! [engine]
//! approved_misalignment_types = ["port-ethernet"]
//! topology_category = "device-config"
//!
//! [restconf]
//! base_url = "https://controller:8545/restconf"
//!
//! [resolver]
//! synchronize_url = "https://controller:8545/approved-misalignments/synchronize"
//! audit_url = "https://controller:8545/approved-misalignments/audit"
//!
//! [schema]
//! base_url = "https://controller:8545/schema"
//! ```
//!
//! Every section is optional and falls back to its defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use intent_restconf::{ResolverConfig, RestconfConfig, SchemaConfig};

use crate::{Error, Result};

/// Category stamped on topology objects unless configured otherwise
pub const DEFAULT_TOPOLOGY_CATEGORY: &str = "device-config";

fn default_topology_category() -> String {
    DEFAULT_TOPOLOGY_CATEGORY.to_string()
}

/// Reconciliation behaviour shared by synchronize and audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Intent types whose desired config and audit reports pass through the
    /// approved-misalignment resolver
    #[serde(default)]
    pub approved_misalignment_types: Vec<String>,

    /// Category label on emitted topology objects
    #[serde(default = "default_topology_category")]
    pub topology_category: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            approved_misalignment_types: Vec::new(),
            topology_category: default_topology_category(),
        }
    }
}

impl EngineSettings {
    /// `true` when `intent_type` opted in to approved-misalignment handling
    pub fn approves_misalignments(&self, intent_type: &str) -> bool {
        self.approved_misalignment_types
            .iter()
            .any(|t| t == intent_type)
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Reconciliation settings
    #[serde(default)]
    pub engine: EngineSettings,

    /// Device access
    #[serde(default)]
    pub restconf: RestconfConfig,

    /// Approved-misalignment service
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// List key lookup service
    #[serde(default)]
    pub schema: SchemaConfig,
}

impl EngineConfig {
    /// Parse a configuration from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use intent_core::EngineConfig;
    ///
    /// let config = EngineConfig::parse(r#"
    /// [engine]
    /// approved_misalignment_types = ["port-ethernet"]
    /// "#).unwrap();
    ///
    /// assert!(config.engine.approves_misalignments("port-ethernet"));
    /// assert_eq!(config.engine.topology_category, "device-config");
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load a configuration file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the file when it cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
