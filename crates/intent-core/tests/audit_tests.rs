//! Audit orchestration against an in-memory device network

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use intent_compare::Error as CompareError;
use intent_core::{
    AuditOrchestrator, CleanupEntry, CleanupLedger, EngineSettings, Error, StaticRenderer,
    SynchronizationEngine,
};
use intent_model::{
    AuditReport, ConfigBlock, Intent, NetworkState, SiteObject, SiteObjects, StateAssertion,
};
use intent_restconf::{DeviceError, MisalignmentResolver, SynchronizeResolution};
use intent_test_utils::FakeDevice;
use intent_test_utils::fixtures::{
    comparator, port_config, port_intent, port_object, port_path, site_objects,
};

const OPER_PATH: &str = "nokia-state:/state/port=1%2F1%2F1";

fn renderer(objects: SiteObjects) -> StaticRenderer {
    StaticRenderer::default().with_device("ne-1", objects)
}

fn orchestrator(device: &Arc<FakeDevice>, renderer: StaticRenderer) -> AuditOrchestrator {
    AuditOrchestrator::new(device.clone(), Arc::new(renderer), comparator(&[]))
}

/// Intent synchronized onto `device` with `objects`
fn synchronized(device: &Arc<FakeDevice>, objects: &SiteObjects) -> Intent {
    let mut intent = port_intent("svc-1", NetworkState::Active);
    let outcome = SynchronizationEngine::new(device.clone(), Arc::new(renderer(objects.clone())))
        .synchronize(&intent)
        .unwrap();
    assert!(outcome.report.success);
    intent.topology = outcome.topology;
    intent
}

#[test]
fn freshly_synchronized_intent_is_aligned() {
    let device = Arc::new(FakeDevice::new());
    let objects = site_objects([("port-1", port_object("1/1/1", 1500))]);
    let intent = synchronized(&device, &objects);

    let report = orchestrator(&device, renderer(objects)).audit(&intent).unwrap();

    assert!(report.is_aligned(), "{report:?}");
    assert_eq!(report.intent_type, "port-ethernet");
    assert_eq!(report.target, "svc-1");
}

#[test]
fn changed_leaf_is_a_misaligned_attribute() {
    let device = Arc::new(FakeDevice::new());
    let objects = site_objects([("port-1", port_object("1/1/1", 1500))]);
    let intent = synchronized(&device, &objects);
    device.set_config("ne-1", &port_path("1/1/1"), port_config("1/1/1", 1400));

    let report = orchestrator(&device, renderer(objects)).audit(&intent).unwrap();

    assert_eq!(report.misaligned_attributes.len(), 1);
    let finding = &report.misaligned_attributes[0];
    assert_eq!(finding.name, format!("{}/ethernet/mtu", port_path("1/1/1")));
    assert_eq!(finding.device_name, "ne-1");
    assert_eq!(finding.expected_value.as_deref(), Some("1500"));
    assert_eq!(finding.actual_value.as_deref(), Some("1400"));
}

#[test]
fn extra_leaf_on_device_is_undesired() {
    let device = Arc::new(FakeDevice::new());
    let objects = site_objects([("port-1", port_object("1/1/1", 1500))]);
    let intent = synchronized(&device, &objects);
    let mut actual = port_config("1/1/1", 1500);
    actual["nokia-conf:port"][0]["description"] = json!("patched by hand");
    device.set_config("ne-1", &port_path("1/1/1"), actual);

    let report = orchestrator(&device, renderer(objects)).audit(&intent).unwrap();

    let finding = report
        .attribute(&format!("{}/description", port_path("1/1/1")))
        .unwrap();
    assert_eq!(finding.expected_value, None);
    assert_eq!(finding.actual_value.as_deref(), Some("patched by hand"));
}

#[test]
fn ignored_children_are_not_reported() {
    let device = Arc::new(FakeDevice::new());
    let block = ConfigBlock::replace(port_path("1/1/1"), port_config("1/1/1", 1500))
        .ignoring(["description"]);
    let objects = site_objects([("port-1", SiteObject::config(block))]);
    let intent = synchronized(&device, &objects);
    let mut actual = port_config("1/1/1", 1500);
    actual["nokia-conf:port"][0]["description"] = json!("managed elsewhere");
    device.set_config("ne-1", &port_path("1/1/1"), actual);

    let report = orchestrator(&device, renderer(objects)).audit(&intent).unwrap();

    assert!(report.is_aligned(), "{report:?}");
}

#[test]
fn unconfigured_object_is_missing() {
    let device = Arc::new(FakeDevice::new());
    let objects = site_objects([("port-1", port_object("1/1/1", 1500))]);
    let intent = port_intent("svc-1", NetworkState::Active);

    let report = orchestrator(&device, renderer(objects)).audit(&intent).unwrap();

    let object = report.object(&port_path("1/1/1")).unwrap();
    assert!(object.is_configured);
    assert!(!object.is_undesired);
    assert_eq!(object.device_name, "ne-1");
}

#[test]
fn ledger_entries_not_reasserted_are_undesired() {
    let device = Arc::new(FakeDevice::new());
    let both = site_objects([
        ("port-1", port_object("1/1/1", 1500)),
        ("port-2", port_object("1/1/2", 1500)),
    ]);
    let intent = synchronized(&device, &both);
    let one = site_objects([("port-1", port_object("1/1/1", 1500))]);
    let patches_before = device.patches().len();

    let report = orchestrator(&device, renderer(one)).audit(&intent).unwrap();

    assert_eq!(report.misaligned_objects.len(), 1);
    let stale = report.object(&port_path("1/1/2")).unwrap();
    assert!(stale.is_undesired);
    assert!(report.misaligned_attributes.is_empty());
    assert_eq!(device.patches().len(), patches_before);
}

#[test]
fn inactive_intent_reports_every_tracked_object() {
    let device = Arc::new(FakeDevice::new());
    let mut intent = port_intent("svc-1", NetworkState::Suspend);
    let mut ledger = CleanupLedger::new();
    ledger.record("ne-1", "port-1", CleanupEntry::remove(port_path("1/1/1")));
    ledger.record("ne-2", "port-2", CleanupEntry::remove(port_path("1/1/2")));
    ledger.persist(&mut intent.topology).unwrap();
    device.set_unreachable("ne-1", true);

    let objects = site_objects([("port-1", port_object("1/1/1", 1500))]);
    let report = orchestrator(&device, renderer(objects)).audit(&intent).unwrap();

    let undesired: Vec<_> = report
        .misaligned_objects
        .iter()
        .map(|o| (o.device_name.as_str(), o.object_id.clone(), o.is_undesired))
        .collect();
    assert_eq!(
        undesired,
        vec![
            ("ne-1", port_path("1/1/1"), true),
            ("ne-2", port_path("1/1/2"), true),
        ]
    );
}

#[test]
fn removed_object_must_be_absent() {
    let device = Arc::new(FakeDevice::new());
    let objects = site_objects([(
        "old-port",
        SiteObject::config(ConfigBlock::remove(port_path("1/1/9"))),
    )]);
    let intent = port_intent("svc-1", NetworkState::Active);

    let audit = orchestrator(&device, renderer(objects));
    assert!(audit.audit(&intent).unwrap().is_aligned());

    device.set_config("ne-1", &port_path("1/1/9"), port_config("1/1/9", 1500));
    let report = audit.audit(&intent).unwrap();
    assert!(report.object(&port_path("1/1/9")).unwrap().is_undesired);
}

#[test]
fn merge_objects_never_report_extra_device_state() {
    let device = Arc::new(FakeDevice::new());
    let path = "nokia-conf:/configure/system/lldp";
    device.set_config("ne-1", path, json!({"nokia-conf:lldp": {"admin-state": "enable", "tx-interval": 30}}));
    let objects = site_objects([(
        "lldp",
        SiteObject::config(ConfigBlock::merge(path, json!({"nokia-conf:lldp": {"admin-state": "enable"}}))),
    )]);

    let report = orchestrator(&device, renderer(objects))
        .audit(&port_intent("svc-1", NetworkState::Active))
        .unwrap();

    assert!(report.is_aligned(), "{report:?}");
}

#[test]
fn reordered_list_entries_compare_by_key() {
    let device = Arc::new(FakeDevice::new());
    let path = "nokia-conf:/configure/router=Base";
    let intended = json!({"nokia-conf:router": [{"router-name": "Base", "interface": [
        {"interface-name": "eth0", "mtu": 1500},
        {"interface-name": "eth1", "mtu": 1500}
    ]}]});
    device.set_config("ne-1", path, json!({"nokia-conf:router": [{"router-name": "Base", "interface": [
        {"interface-name": "eth1", "mtu": 1500},
        {"interface-name": "eth0", "mtu": 1400}
    ]}]}));
    let objects = site_objects([("router", SiteObject::config(ConfigBlock::replace(path, intended)))]);
    let list = format!("{path}/interface");

    let report = AuditOrchestrator::new(
        device.clone(),
        Arc::new(renderer(objects)),
        comparator(&[(list.as_str(), &["interface-name"][..])]),
    )
    .audit(&port_intent("svc-1", NetworkState::Active))
    .unwrap();

    assert_eq!(report.misaligned_attributes.len(), 1);
    assert_eq!(report.misaligned_attributes[0].name, format!("{path}/interface=eth0/mtu"));
}

#[test]
fn extra_device_list_entry_is_reported_as_that_entry() {
    let device = Arc::new(FakeDevice::new());
    let path = "nokia-conf:/configure/sap=a";
    device.set_config("ne-1", path, json!({"nokia-conf:sap": [
        {"sap-id": "a", "mtu": 1500},
        {"sap-id": "b", "mtu": 9000}
    ]}));
    let intended = json!({"nokia-conf:sap": [{"sap-id": "a", "mtu": 1500}]});
    let objects = site_objects([("sap-a", SiteObject::config(ConfigBlock::replace(path, intended)))]);

    let report = AuditOrchestrator::new(
        device.clone(),
        Arc::new(renderer(objects)),
        comparator(&[("nokia-conf:/configure/sap", &["sap-id"][..])]),
    )
    .audit(&port_intent("svc-1", NetworkState::Active))
    .unwrap();

    assert!(report.misaligned_attributes.is_empty(), "{report:?}");
    assert_eq!(report.misaligned_objects.len(), 1);
    let extra = &report.misaligned_objects[0];
    assert_eq!(extra.object_id, "nokia-conf:/configure/sap=b");
    assert!(extra.is_undesired);
}

fn health_object(check: &str, expected: Value) -> SiteObject {
    port_object("1/1/1", 1500).with_health(
        OPER_PATH,
        vec![StateAssertion::new("$.oper-state", check, expected)],
    )
}

#[test]
fn health_assertions_read_operational_state() {
    let device = Arc::new(FakeDevice::new());
    let objects = site_objects([("port-1", health_object("equals", json!("up")))]);
    let intent = synchronized(&device, &objects);
    device.set_state("ne-1", OPER_PATH, json!({"nokia-state:port": [{"oper-state": "down"}]}));

    let report = orchestrator(&device, renderer(objects)).audit(&intent).unwrap();

    let finding = report.attribute(&format!("{OPER_PATH}/oper-state")).unwrap();
    assert_eq!(finding.expected_value.as_deref(), Some("up"));
    assert_eq!(finding.actual_value.as_deref(), Some("down"));
}

#[test]
fn absent_state_fails_every_assertion() {
    let device = Arc::new(FakeDevice::new());
    let objects = site_objects([("port-1", health_object("startsWith", json!("up")))]);
    let intent = synchronized(&device, &objects);

    let report = orchestrator(&device, renderer(objects)).audit(&intent).unwrap();

    let finding = report.attribute(&format!("{OPER_PATH}/oper-state")).unwrap();
    assert_eq!(finding.expected_value.as_deref(), Some("up"));
    assert_eq!(finding.actual_value, None);
}

#[test]
fn unsupported_check_aborts_the_audit() {
    let device = Arc::new(FakeDevice::new());
    let objects = site_objects([("port-1", health_object("greaterThan", json!(1)))]);
    let intent = synchronized(&device, &objects);

    let result = orchestrator(&device, renderer(objects)).audit(&intent);

    assert!(matches!(
        result,
        Err(Error::Compare(CompareError::UnsupportedCheck { .. }))
    ));
}

#[test]
fn unreachable_device_aborts_the_audit() {
    let device = Arc::new(FakeDevice::new());
    let objects = site_objects([("port-1", port_object("1/1/1", 1500))]);
    device.set_unreachable("ne-1", true);

    let result = orchestrator(&device, renderer(objects)).audit(&port_intent("svc-1", NetworkState::Active));

    assert!(matches!(result, Err(Error::Device(DeviceError::Connectivity { .. }))));
}

struct ApproveMtu;

impl MisalignmentResolver for ApproveMtu {
    fn resolve_synchronize(&self, request: &SynchronizeResolution<'_>) -> Result<Value, DeviceError> {
        Ok(request.desired_config.clone())
    }

    fn resolve_audit(&self, report: &AuditReport) -> Result<AuditReport, DeviceError> {
        let mut filtered = report.clone();
        filtered
            .misaligned_attributes
            .retain(|a| !a.name.ends_with("/ethernet/mtu"));
        Ok(filtered)
    }
}

#[test]
fn approved_misalignments_are_filtered_for_flagged_types() {
    let device = Arc::new(FakeDevice::new());
    let objects = site_objects([("port-1", port_object("1/1/1", 1500))]);
    let intent = synchronized(&device, &objects);
    device.set_config("ne-1", &port_path("1/1/1"), port_config("1/1/1", 9000));

    let unflagged = orchestrator(&device, renderer(objects.clone()))
        .with_resolver(Arc::new(ApproveMtu))
        .audit(&intent)
        .unwrap();
    assert_eq!(unflagged.misaligned_attributes.len(), 1);

    let flagged = orchestrator(&device, renderer(objects))
        .with_resolver(Arc::new(ApproveMtu))
        .with_settings(EngineSettings {
            approved_misalignment_types: vec!["port-ethernet".to_string()],
            ..EngineSettings::default()
        })
        .audit(&intent)
        .unwrap();
    assert!(flagged.is_aligned());
}

#[test]
fn indicators_are_collected_per_device_and_object() {
    let device = Arc::new(FakeDevice::new());
    device.set_state(
        "ne-1",
        OPER_PATH,
        json!({"nokia-state:port": [{"oper-state": "up", "statistics": {"in-octets": 42}}]}),
    );
    let object = port_object("1/1/1", 1500)
        .with_indicator(OPER_PATH, "in-octets", "$.statistics.in-octets")
        .with_indicator(OPER_PATH, "speed", "$.ethernet.speed");
    let objects = site_objects([("port-1", object)]);

    let indicators = orchestrator(&device, renderer(objects))
        .indicators(&port_intent("svc-1", NetworkState::Active))
        .unwrap();

    let values = &indicators["ne-1"]["port-1"];
    assert_eq!(values["in-octets"], json!(42));
    assert_eq!(values["speed"], Value::Null);
}

#[test]
fn inactive_intents_have_no_indicators() {
    let device = Arc::new(FakeDevice::new());
    let objects = site_objects([(
        "port-1",
        port_object("1/1/1", 1500).with_indicator(OPER_PATH, "state", "$.oper-state"),
    )]);

    let indicators = orchestrator(&device, renderer(objects))
        .indicators(&port_intent("svc-1", NetworkState::Delete))
        .unwrap();

    assert!(indicators.is_empty());
}
