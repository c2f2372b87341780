//! Audit report types
//!
//! An audit produces leaf-level [`MisAlignedAttribute`] findings and
//! subtree-level [`MisAlignedObject`] findings. Reports are built fresh for
//! every audit call and never persisted.

use serde::{Deserialize, Serialize};

/// A leaf whose actual value differs from the intended one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MisAlignedAttribute {
    /// Full device path of the leaf
    pub name: String,
    /// Device the leaf was read from
    pub device_name: String,
    /// Intended value, `None` when the leaf should be absent
    pub expected_value: Option<String>,
    /// Actual value, `None` when the leaf is absent
    pub actual_value: Option<String>,
}

/// A subtree that is missing, or present but undesired
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MisAlignedObject {
    /// Full device path of the subtree
    pub object_id: String,
    /// Device the subtree belongs to
    pub device_name: String,
    /// Whether the subtree is managed by configuration
    pub is_configured: bool,
    /// `true` when the subtree exists but should not
    pub is_undesired: bool,
}

/// Findings of one audit call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AuditReport {
    /// Intent type that was audited
    pub intent_type: String,
    /// Target that was audited
    pub target: String,
    /// Leaf-level findings
    #[serde(rename = "misaligned-attribute", default)]
    pub misaligned_attributes: Vec<MisAlignedAttribute>,
    /// Subtree-level findings
    #[serde(rename = "misaligned-object", default)]
    pub misaligned_objects: Vec<MisAlignedObject>,
}

impl AuditReport {
    /// Create an empty report for an intent
    pub fn new(intent_type: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            intent_type: intent_type.into(),
            target: target.into(),
            misaligned_attributes: Vec::new(),
            misaligned_objects: Vec::new(),
        }
    }

    /// `true` when there are no findings
    pub fn is_aligned(&self) -> bool {
        self.misaligned_attributes.is_empty() && self.misaligned_objects.is_empty()
    }

    /// Record a leaf difference
    pub fn add_attribute(
        &mut self,
        name: impl Into<String>,
        device: &str,
        expected: Option<String>,
        actual: Option<String>,
    ) {
        self.misaligned_attributes.push(MisAlignedAttribute {
            name: name.into(),
            device_name: device.to_string(),
            expected_value: expected,
            actual_value: actual,
        });
    }

    /// Record an intended subtree that is absent on the device
    pub fn add_missing_object(&mut self, object_id: impl Into<String>, device: &str) {
        self.push_object(object_id.into(), device, false);
    }

    /// Record a device subtree that the intent does not want
    pub fn add_undesired_object(&mut self, object_id: impl Into<String>, device: &str) {
        self.push_object(object_id.into(), device, true);
    }

    fn push_object(&mut self, object_id: String, device: &str, undesired: bool) {
        self.misaligned_objects.push(MisAlignedObject {
            object_id,
            device_name: device.to_string(),
            is_configured: true,
            is_undesired: undesired,
        });
    }

    /// Find an attribute finding by path
    pub fn attribute(&self, name: &str) -> Option<&MisAlignedAttribute> {
        self.misaligned_attributes.iter().find(|a| a.name == name)
    }

    /// Find an object finding by path
    pub fn object(&self, object_id: &str) -> Option<&MisAlignedObject> {
        self.misaligned_objects.iter().find(|o| o.object_id == object_id)
    }
}
