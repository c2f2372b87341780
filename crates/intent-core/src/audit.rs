//! Audit of devices against an intent
//!
//! An audit reads back every rendered object, diffs it against the intended
//! configuration, evaluates health assertions against device state, and
//! reports ledger entries nobody reasserted as undesired. Devices are never
//! written to.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use intent_compare::{CompareScope, ConfigComparator, compare_state, query, unwrap_container};
use intent_model::{AuditReport, ConfigBlock, Intent, NetworkState, PatchOperation, SiteObject};
use intent_restconf::{DeviceClient, MisalignmentResolver};

use crate::config::EngineSettings;
use crate::ledger::CleanupLedger;
use crate::render::SiteRenderer;
use crate::{Error, Result};

/// Indicator values: device → object → indicator name → value
pub type Indicators = BTreeMap<String, BTreeMap<String, BTreeMap<String, Value>>>;

/// Drives per-device reads and comparisons for one intent at a time
pub struct AuditOrchestrator {
    devices: Arc<dyn DeviceClient>,
    renderer: Arc<dyn SiteRenderer>,
    comparator: ConfigComparator,
    resolver: Option<Arc<dyn MisalignmentResolver>>,
    settings: EngineSettings,
}

impl AuditOrchestrator {
    /// Create an orchestrator
    pub fn new(
        devices: Arc<dyn DeviceClient>,
        renderer: Arc<dyn SiteRenderer>,
        comparator: ConfigComparator,
    ) -> Self {
        Self {
            devices,
            renderer,
            comparator,
            resolver: None,
            settings: EngineSettings::default(),
        }
    }

    /// Filter reports of approved intent types through `resolver`
    pub fn with_resolver(mut self, resolver: Arc<dyn MisalignmentResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Use non-default engine settings
    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Compare the devices of `intent` with what it asks for
    ///
    /// # Errors
    ///
    /// Fails on a corrupt ledger, a render failure, an unreachable device,
    /// an unsupported health check or a resolver failure. Drift itself is
    /// never an error; it is what the report carries.
    pub fn audit(&self, intent: &Intent) -> Result<AuditReport> {
        let mut still_tracked = CleanupLedger::restore(&intent.topology)?;
        let mut report = AuditReport::new(&intent.intent_type, &intent.target);

        if intent.network_state == NetworkState::Active {
            for device_id in self.renderer.devices(intent)? {
                let objects = self.renderer.render(intent, &device_id)?;
                for (name, object) in &objects {
                    if let Some(block) = &object.config {
                        self.audit_config(&device_id, block, &mut report)?;
                        still_tracked.remove_entry(&device_id, name);
                    }
                    self.audit_health(&device_id, object, &mut report)?;
                }
            }
        }

        for (device_id, name, entry) in still_tracked.entries() {
            tracing::debug!(device = %device_id, object = %name, target = %entry.target, "Tracked object no longer wanted");
            report.add_undesired_object(&entry.target, device_id);
        }

        if self.settings.approves_misalignments(&intent.intent_type)
            && let Some(resolver) = &self.resolver
        {
            report = resolver
                .resolve_audit(&report)
                .map_err(|e| Error::Resolver {
                    message: e.to_string(),
                })?;
        }

        tracing::info!(
            target_id = %intent.target,
            attributes = report.misaligned_attributes.len(),
            objects = report.misaligned_objects.len(),
            "Audit complete"
        );
        Ok(report)
    }

    /// Indicator values collected from device state
    ///
    /// Only active intents are rendered; other states yield nothing. A
    /// selector that matches nothing yields `null`.
    pub fn indicators(&self, intent: &Intent) -> Result<Indicators> {
        let mut indicators = Indicators::new();
        if intent.network_state != NetworkState::Active {
            return Ok(indicators);
        }

        for device_id in self.renderer.devices(intent)? {
            let objects = self.renderer.render(intent, &device_id)?;
            for (name, object) in &objects {
                for (state_path, selectors) in &object.indicators {
                    let state = self.read_state(&device_id, state_path)?;
                    let values = indicators
                        .entry(device_id.clone())
                        .or_default()
                        .entry(name.clone())
                        .or_default();
                    for (indicator, selector) in selectors {
                        let value = query(&state, selector)?.cloned().unwrap_or(Value::Null);
                        values.insert(indicator.clone(), value);
                    }
                }
            }
        }
        Ok(indicators)
    }

    fn audit_config(&self, device_id: &str, block: &ConfigBlock, report: &mut AuditReport) -> Result<()> {
        let actual = self.devices.get_config(device_id, &block.target)?;

        match (block.operation, actual) {
            (PatchOperation::Remove, None) => {}
            (PatchOperation::Remove, Some(_)) => {
                tracing::debug!(device = %device_id, target = %block.target, "Removed object still present");
                report.add_undesired_object(&block.target, device_id);
            }
            (_, None) => {
                tracing::debug!(device = %device_id, target = %block.target, "Object not configured");
                report.add_missing_object(&block.target, device_id);
            }
            (operation, Some(actual)) => {
                let intended = block.value.clone().unwrap_or_else(|| Value::Object(Map::new()));
                let scope = CompareScope::new(device_id, &block.target)
                    .with_operation(operation)
                    .with_ignore_children(&block.ignore_children);
                self.comparator
                    .compare_document(&scope, &actual, &intended, report);
            }
        }
        Ok(())
    }

    fn audit_health(&self, device_id: &str, object: &SiteObject, report: &mut AuditReport) -> Result<()> {
        for (state_path, assertions) in &object.health {
            let state = self.read_state(device_id, state_path)?;
            compare_state(device_id, &state, assertions, report, state_path)?;
        }
        Ok(())
    }

    /// Unwrapped state subtree; an absent subtree reads as empty
    fn read_state(&self, device_id: &str, state_path: &str) -> Result<Value> {
        Ok(self
            .devices
            .get_state(device_id, state_path)?
            .map(|state| unwrap_container(&state))
            .unwrap_or_else(|| Value::Object(Map::new())))
    }
}
