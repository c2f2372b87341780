//! Seams to the collaborators the engine does not own
//!
//! Site rendering (intent document to per-device objects) and resource pool
//! release are performed elsewhere; the engine only sees these traits.

use std::collections::BTreeMap;

use intent_model::{Intent, SiteObjects};

use crate::{Error, Result};

/// Renders an intent into per-device site objects
pub trait SiteRenderer: Send + Sync {
    /// Devices the intent spans
    fn devices(&self, intent: &Intent) -> Result<Vec<String>>;

    /// Site objects for one device
    ///
    /// Failures should be [`Error::Render`] with a message describing the
    /// fault; the engine attributes it to `device_id`.
    fn render(&self, intent: &Intent, device_id: &str) -> Result<SiteObjects>;
}

/// Releases external resources held by an intent once it is deleted
pub trait ResourceReleaser: Send + Sync {
    /// Release everything allocated for `intent`
    fn release(&self, intent: &Intent) -> Result<()>;
}

/// Renderer serving site objects rendered ahead of time
#[derive(Debug, Clone, Default)]
pub struct StaticRenderer {
    sites: BTreeMap<String, SiteObjects>,
}

impl StaticRenderer {
    /// Create a renderer over `device → objects`
    pub fn new(sites: BTreeMap<String, SiteObjects>) -> Self {
        Self { sites }
    }

    /// Add or replace the objects of one device
    pub fn with_device(mut self, device_id: impl Into<String>, objects: SiteObjects) -> Self {
        self.sites.insert(device_id.into(), objects);
        self
    }

    /// Parse `{"<device>": {"<object>": {...}}}`
    pub fn from_json(content: &str) -> Result<Self> {
        let sites: BTreeMap<String, SiteObjects> = serde_json::from_str(content)?;
        Ok(Self::new(sites))
    }
}

impl SiteRenderer for StaticRenderer {
    fn devices(&self, _intent: &Intent) -> Result<Vec<String>> {
        Ok(self.sites.keys().cloned().collect())
    }

    fn render(&self, intent: &Intent, device_id: &str) -> Result<SiteObjects> {
        self.sites.get(device_id).cloned().ok_or_else(|| {
            Error::render(format!(
                "no site objects for device {device_id} in intent {}",
                intent.target
            ))
        })
    }
}
