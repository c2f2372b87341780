//! Synchronize and audit across the whole lifecycle of an intent
//!
//! These scenarios drive the engine the way a hosting controller would:
//! the intent (with its topology) is stored between calls, devices drift in
//! between, and every call starts from the stored document.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use intent_core::{AuditOrchestrator, CleanupLedger, LEDGER_KEY, StaticRenderer, SynchronizationEngine};
use intent_model::{AuditReport, ConfigBlock, Intent, NetworkState, SiteObject, SiteObjects};
use intent_restconf::DeviceClient;
use intent_test_utils::FakeDevice;
use intent_test_utils::fixtures::{
    comparator, port_config, port_intent, port_object, port_path, site_objects,
};

struct Controller {
    device: Arc<FakeDevice>,
    stored: String,
}

impl Controller {
    fn new(intent: &Intent) -> Self {
        Self {
            device: Arc::new(FakeDevice::new()),
            stored: serde_json::to_string(intent).unwrap(),
        }
    }

    fn intent(&self) -> Intent {
        serde_json::from_str(&self.stored).unwrap()
    }

    fn set_state(&mut self, state: NetworkState) {
        let mut intent = self.intent();
        intent.network_state = state;
        self.stored = serde_json::to_string(&intent).unwrap();
    }

    fn synchronize(&mut self, renderer: &StaticRenderer) -> Vec<String> {
        let mut intent = self.intent();
        let outcome = SynchronizationEngine::new(self.device.clone(), Arc::new(renderer.clone()))
            .synchronize(&intent)
            .unwrap();
        intent.topology = outcome.topology;
        self.stored = serde_json::to_string(&intent).unwrap();
        outcome.report.errors
    }

    fn audit(&self, renderer: &StaticRenderer) -> AuditReport {
        AuditOrchestrator::new(self.device.clone(), Arc::new(renderer.clone()), comparator(&[]))
            .audit(&self.intent())
            .unwrap()
    }

    fn ledger(&self) -> CleanupLedger {
        CleanupLedger::restore(&self.intent().topology).unwrap()
    }
}

fn sites(ne_a: SiteObjects, ne_b: SiteObjects) -> StaticRenderer {
    StaticRenderer::default()
        .with_device("ne-a", ne_a)
        .with_device("ne-b", ne_b)
}

#[test]
fn intent_lifecycle_converges_at_every_step() {
    let mut controller = Controller::new(&port_intent("svc-1", NetworkState::Active));
    let renderer = sites(
        site_objects([("port-1", port_object("1/1/1", 1500))]),
        site_objects([("port-2", port_object("1/1/2", 1500))]),
    );

    assert!(controller.synchronize(&renderer).is_empty());
    assert!(controller.audit(&renderer).is_aligned());

    controller
        .device
        .set_config("ne-a", &port_path("1/1/1"), port_config("1/1/1", 1400));
    let drifted = controller.audit(&renderer);
    assert_eq!(drifted.misaligned_attributes.len(), 1);
    assert_eq!(drifted.misaligned_attributes[0].device_name, "ne-a");

    assert!(controller.synchronize(&renderer).is_empty());
    assert!(controller.audit(&renderer).is_aligned());

    controller.set_state(NetworkState::Suspend);
    assert!(controller.synchronize(&renderer).is_empty());
    assert!(controller.device.configured_paths("ne-a").is_empty());
    assert!(controller.device.configured_paths("ne-b").is_empty());
    assert!(controller.ledger().is_empty());
    assert!(controller.intent().topology.objects.is_empty());
    assert!(controller.audit(&renderer).is_aligned());
}

#[test]
fn partial_failure_preserves_the_failed_device_and_retry_converges() {
    let mut controller = Controller::new(&port_intent("svc-1", NetworkState::Active));
    let first = sites(
        site_objects([("port-1", port_object("1/1/1", 1500))]),
        site_objects([("port-2", port_object("1/1/2", 1500))]),
    );
    assert!(controller.synchronize(&first).is_empty());
    let ne_b_before = serde_json::to_string(controller.ledger().device("ne-b").unwrap()).unwrap();

    let second = sites(
        site_objects([("port-1", port_object("1/1/1", 9000))]),
        site_objects([("port-3", port_object("1/1/3", 1500))]),
    );
    controller.device.fail_next_patch("ne-b", "resource busy");
    let errors = controller.synchronize(&second);

    assert_eq!(errors, vec!["[device: ne-b] resource busy".to_string()]);
    let ne_b_after = serde_json::to_string(controller.ledger().device("ne-b").unwrap()).unwrap();
    assert_eq!(ne_b_after, ne_b_before);
    assert_eq!(
        controller.device.config("ne-a", &port_path("1/1/1")).unwrap()["nokia-conf:port"][0]["ethernet"]["mtu"],
        json!(9000)
    );
    assert!(controller.device.config("ne-b", &port_path("1/1/2")).is_some());

    let audit = controller.audit(&second);
    assert!(audit.object(&port_path("1/1/2")).unwrap().is_undesired);
    assert!(!audit.object(&port_path("1/1/3")).unwrap().is_undesired);

    assert!(controller.synchronize(&second).is_empty());
    assert_eq!(controller.device.configured_paths("ne-b"), vec![port_path("1/1/3")]);
    assert!(controller.audit(&second).is_aligned());
}

#[test]
fn unchanged_resync_keeps_the_ledger_byte_identical() {
    let mut controller = Controller::new(&port_intent("svc-1", NetworkState::Active));
    let renderer = sites(
        site_objects([
            ("port-1", port_object("1/1/1", 1500)),
            ("port-5", port_object("1/1/5", 1500)),
        ]),
        site_objects([("port-2", port_object("1/1/2", 1500))]),
    );

    controller.synchronize(&renderer);
    let first = controller.intent().topology.extra_info[LEDGER_KEY].clone();
    controller.synchronize(&renderer);
    let second = controller.intent().topology.extra_info[LEDGER_KEY].clone();

    assert_eq!(first, second);
}

#[test]
fn orphaned_object_is_drift_without_reading_it() {
    let mut controller = Controller::new(&port_intent("svc-1", NetworkState::Active));
    let before = sites(
        site_objects([
            ("port-1", port_object("1/1/1", 1500)),
            ("port-9", port_object("1/1/9", 1500)),
        ]),
        SiteObjects::new(),
    );
    controller.synchronize(&before);

    let after = sites(site_objects([("port-1", port_object("1/1/1", 1500))]), SiteObjects::new());
    controller.device.set_unreachable("ne-b", true);
    let report = controller.audit(&after);

    assert_eq!(report.misaligned_objects.len(), 1);
    let orphan = &report.misaligned_objects[0];
    assert_eq!(orphan.object_id, port_path("1/1/9"));
    assert_eq!(orphan.device_name, "ne-a");
    assert!(orphan.is_configured);
    assert!(orphan.is_undesired);
}

#[test]
fn equivalent_addresses_are_aligned_end_to_end() {
    let mut controller = Controller::new(&port_intent("svc-1", NetworkState::Active));
    let path = "nokia-conf:/configure/router=Base/interface=system";
    let intended = json!({"nokia-conf:interface": [{
        "interface-name": "system",
        "ipv6": {"address": "2001:0db8:0000:0000:0000:ff00:0042:8329"}
    }]});
    let renderer = sites(
        site_objects([("system", SiteObject::config(ConfigBlock::replace(path, intended)))]),
        SiteObjects::new(),
    );
    controller.synchronize(&renderer);

    controller.device.set_config(
        "ne-a",
        path,
        json!({"nokia-conf:interface": [{
            "interface-name": "system",
            "ipv6": {"address": "2001:db8::ff00:42:8329"}
        }]}),
    );

    assert!(controller.audit(&renderer).is_aligned());
}

#[test]
fn removing_an_absent_object_succeeds() {
    let device = FakeDevice::new();
    device.remove("ne-a", &port_path("1/1/1")).unwrap();
    device.remove("ne-a", &port_path("1/1/1")).unwrap();

    let mut controller = Controller::new(&port_intent("svc-1", NetworkState::Active));
    let renderer = sites(site_objects([("port-1", port_object("1/1/1", 1500))]), SiteObjects::new());
    controller.synchronize(&renderer);
    controller.device.remove("ne-a", &port_path("1/1/1")).unwrap();

    controller.set_state(NetworkState::Delete);
    assert!(controller.synchronize(&renderer).is_empty());
    assert!(controller.ledger().is_empty());
}
