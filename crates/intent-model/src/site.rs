//! Rendered per-device site objects
//!
//! The external renderer turns an intent into one [`SiteObjects`] map per
//! device. Each named entry may carry a `config` block to push, `health`
//! assertions to check against device state, and `indicators` to collect.
//! Site objects are transient: they live for one synchronize or audit call.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// Object name → rendered entry, for one device
pub type SiteObjects = BTreeMap<String, SiteObject>;

/// RESTCONF patch edit operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOperation {
    /// Idempotent set of the whole subtree
    Replace,
    /// Additive merge into the subtree
    Merge,
    /// Idempotent delete of the subtree
    Remove,
}

impl fmt::Display for PatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => write!(f, "replace"),
            Self::Merge => write!(f, "merge"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

impl FromStr for PatchOperation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "replace" => Ok(Self::Replace),
            "merge" => Ok(Self::Merge),
            "remove" => Ok(Self::Remove),
            other => Err(Error::UnknownOperation(other.to_string())),
        }
    }
}

/// Configuration to push for one site object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigBlock {
    /// Device path the edit applies to
    pub target: String,
    /// Subtree value; absent for `remove`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Edit operation
    pub operation: PatchOperation,
    /// Relative paths whose extra actual content is pre-approved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore_children: Vec<String>,
}

impl ConfigBlock {
    /// A `replace` edit of `value` at `target`
    pub fn replace(target: impl Into<String>, value: Value) -> Self {
        Self {
            target: target.into(),
            value: Some(value),
            operation: PatchOperation::Replace,
            ignore_children: Vec::new(),
        }
    }

    /// A `merge` edit of `value` at `target`
    pub fn merge(target: impl Into<String>, value: Value) -> Self {
        Self {
            target: target.into(),
            value: Some(value),
            operation: PatchOperation::Merge,
            ignore_children: Vec::new(),
        }
    }

    /// A `remove` edit at `target`
    pub fn remove(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            value: None,
            operation: PatchOperation::Remove,
            ignore_children: Vec::new(),
        }
    }

    /// Mark relative paths whose extra content should not be reported
    pub fn ignoring<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_children.extend(paths.into_iter().map(Into::into));
        self
    }
}

/// One health assertion against device state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateAssertion {
    /// Path query into the state subtree (e.g., `$.oper-state`)
    pub path: String,
    /// Operator name; `equals` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<String>,
    /// Expected value
    pub value: Value,
}

impl StateAssertion {
    /// Build an assertion with an explicit operator
    pub fn new(path: impl Into<String>, check: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            check: Some(check.into()),
            value,
        }
    }
}

/// A rendered site object entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteObject {
    /// Configuration to push
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigBlock>,
    /// State path → assertions evaluated against that state subtree
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub health: BTreeMap<String, Vec<StateAssertion>>,
    /// State path → indicator name → path query
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub indicators: BTreeMap<String, BTreeMap<String, String>>,
}

impl SiteObject {
    /// A site object with only a config block
    pub fn config(block: ConfigBlock) -> Self {
        Self {
            config: Some(block),
            ..Self::default()
        }
    }

    /// Add health assertions for a state path
    pub fn with_health(mut self, state_path: impl Into<String>, checks: Vec<StateAssertion>) -> Self {
        self.health.entry(state_path.into()).or_default().extend(checks);
        self
    }

    /// Add an indicator selector for a state path
    pub fn with_indicator(
        mut self,
        state_path: impl Into<String>,
        name: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        self.indicators
            .entry(state_path.into())
            .or_default()
            .insert(name.into(), query.into());
        self
    }
}
