//! SynchronizationEngine implementation

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use intent_model::{ConfigBlock, Intent, NetworkState, PatchOperation};
use intent_restconf::{DeviceClient, MisalignmentResolver, PatchRequest, SynchronizeResolution};

use crate::config::EngineSettings;
use crate::ledger::{CleanupEntry, CleanupLedger, DeviceEntries};
use crate::render::{ResourceReleaser, SiteRenderer};
use crate::{Error, Result};

use super::report::{SyncOutcome, SyncReport};

/// Pending edits per device, keyed by object name
type WorkingSet = BTreeMap<String, BTreeMap<String, ConfigBlock>>;

/// Engine applying an intent's rendered configuration to its devices
///
/// The engine holds no state between calls: everything it needs to remember
/// lives in the intent's topology. Calls for the same target must not
/// overlap; see [`crate::TargetLocks`].
pub struct SynchronizationEngine {
    devices: Arc<dyn DeviceClient>,
    renderer: Arc<dyn SiteRenderer>,
    resolver: Option<Arc<dyn MisalignmentResolver>>,
    releaser: Option<Arc<dyn ResourceReleaser>>,
    settings: EngineSettings,
}

impl SynchronizationEngine {
    /// Create an engine over a device client and a renderer
    pub fn new(devices: Arc<dyn DeviceClient>, renderer: Arc<dyn SiteRenderer>) -> Self {
        Self {
            devices,
            renderer,
            resolver: None,
            releaser: None,
            settings: EngineSettings::default(),
        }
    }

    /// Filter desired config of approved intent types through `resolver`
    pub fn with_resolver(mut self, resolver: Arc<dyn MisalignmentResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Release external resources after a successful delete
    pub fn with_releaser(mut self, releaser: Arc<dyn ResourceReleaser>) -> Self {
        self.releaser = Some(releaser);
        self
    }

    /// Use non-default engine settings
    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Reconcile the devices of `intent` with its desired state
    ///
    /// Per-device failures are collected in the report and never abort the
    /// call. The returned topology always carries the persisted ledger.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stored ledger cannot be decoded or
    /// re-encoded.
    pub fn synchronize(&self, intent: &Intent) -> Result<SyncOutcome> {
        let mut ledger = CleanupLedger::restore(&intent.topology)?;
        let mut report = SyncReport::success();
        let mut topology = intent.topology.clone();

        tracing::debug!(
            target_id = %intent.target,
            state = %intent.network_state,
            tracked = ledger.len(),
            "Synchronizing intent"
        );

        if intent.network_state != NetworkState::Custom {
            let mut working = seed_working_set(&ledger);
            let mut skipped = BTreeSet::new();

            let rendered = intent.network_state != NetworkState::Active
                || self.overlay_rendered(intent, &mut working, &mut skipped, &mut report);

            if rendered {
                for (device_id, edits) in &working {
                    if skipped.contains(device_id) {
                        continue;
                    }
                    self.apply_device(device_id, edits, &mut ledger, &mut report);
                }
            }
            topology.set_objects(ledger.topology_objects(&self.settings.topology_category));
        }

        ledger.persist(&mut topology)?;

        if report.success && intent.network_state == NetworkState::Delete {
            self.release(intent, &mut report);
        }

        Ok(SyncOutcome { topology, report })
    }

    /// Overlay freshly rendered config blocks onto the working set
    ///
    /// Returns `false` when the device list itself cannot be rendered; nothing
    /// may be patched then, since every tracked object would look stale.
    fn overlay_rendered(
        &self,
        intent: &Intent,
        working: &mut WorkingSet,
        skipped: &mut BTreeSet<String>,
        report: &mut SyncReport,
    ) -> bool {
        let device_ids = match self.renderer.devices(intent) {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(target_id = %intent.target, error = %e, "Cannot list intent devices");
                report.push_error(format!("[intent: {}] {e}", intent.target));
                return false;
            }
        };

        for device_id in device_ids {
            match self.rendered_blocks(intent, &device_id) {
                Ok(blocks) => {
                    let edits = working.entry(device_id).or_default();
                    for (name, block) in blocks {
                        tracing::debug!(object = %name, target = %block.target, operation = %block.operation, "Rendered object");
                        edits.insert(name, block);
                    }
                }
                Err(e) => {
                    tracing::warn!(device = %device_id, error = %e, "Skipping device");
                    report.push_error(format!("[device: {device_id}] {e}"));
                    skipped.insert(device_id);
                }
            }
        }
        true
    }

    /// Config blocks rendered for one device, resolved when approved
    fn rendered_blocks(&self, intent: &Intent, device_id: &str) -> Result<Vec<(String, ConfigBlock)>> {
        let objects = self.renderer.render(intent, device_id)?;
        let resolver = self
            .resolver
            .as_ref()
            .filter(|_| self.settings.approves_misalignments(&intent.intent_type));

        let mut blocks = Vec::new();
        for (name, object) in objects {
            let Some(mut block) = object.config else {
                continue;
            };
            if let Some(resolver) = resolver
                && block.operation != PatchOperation::Remove
                && let Some(value) = &block.value
            {
                let request = SynchronizeResolution {
                    intent_type: &intent.intent_type,
                    target: &intent.target,
                    device_id,
                    root_path: &block.target,
                    desired_config: value,
                };
                let resolved = resolver
                    .resolve_synchronize(&request)
                    .map_err(|e| Error::Resolver {
                        message: e.to_string(),
                    })?;
                block.value = Some(resolved);
            }
            blocks.push((name, block));
        }
        Ok(blocks)
    }

    /// Patch one device and fold the outcome into the ledger
    fn apply_device(
        &self,
        device_id: &str,
        edits: &BTreeMap<String, ConfigBlock>,
        ledger: &mut CleanupLedger,
        report: &mut SyncReport,
    ) {
        if edits.is_empty() {
            ledger.replace_device(device_id, DeviceEntries::new());
            return;
        }

        let request = build_request(edits);
        match self.devices.patch(device_id, &request) {
            Ok(()) => {
                let applied: DeviceEntries = edits
                    .iter()
                    .filter(|(_, block)| block.operation == PatchOperation::Replace)
                    .map(|(name, block)| (name.clone(), CleanupEntry::remove(&block.target)))
                    .collect();
                tracing::info!(
                    device = %device_id,
                    edits = edits.len(),
                    tracked = applied.len(),
                    "Device synchronized"
                );
                report.push_action(format!("[device: {device_id}] applied {} edit(s)", edits.len()));
                ledger.replace_device(device_id, applied);
            }
            Err(e) => {
                tracing::warn!(device = %device_id, error = %e, "Device patch failed");
                report.push_error(format!("[device: {device_id}] {e}"));
            }
        }
    }

    fn release(&self, intent: &Intent, report: &mut SyncReport) {
        let Some(releaser) = &self.releaser else {
            return;
        };
        match releaser.release(intent) {
            Ok(()) => report.push_action(format!("released resources of {}", intent.target)),
            Err(e) => {
                tracing::warn!(target_id = %intent.target, error = %e, "Resource release failed");
                report.push_error(format!("resource release failed: {e}"));
            }
        }
    }
}

/// Working set seeded with the rollback of every tracked object
fn seed_working_set(ledger: &CleanupLedger) -> WorkingSet {
    let mut working = WorkingSet::new();
    for (device_id, name, entry) in ledger.entries() {
        working
            .entry(device_id.to_string())
            .or_default()
            .insert(name.to_string(), entry.to_block());
    }
    working
}

/// One edit per object; `remove` edits never carry a value
fn build_request(edits: &BTreeMap<String, ConfigBlock>) -> PatchRequest {
    let mut request = PatchRequest::new();
    for (name, block) in edits {
        let value = match block.operation {
            PatchOperation::Remove => None,
            _ => block.value.clone(),
        };
        request.push_edit(name, &block.target, value, block.operation);
    }
    request
}
