//! Overlapping reconciliation calls serialized per target
//!
//! Each worker plays a controller thread: load the stored intent, synchronize
//! it with its own rendering, store it back. Holding the target lock across
//! that whole sequence means no worker can act on a stale ledger, so the
//! device ends up with exactly the objects of the last run.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;

use pretty_assertions::assert_eq;

use intent_core::{CleanupLedger, StaticRenderer, SynchronizationEngine, TargetLocks};
use intent_model::{Intent, NetworkState};
use intent_test_utils::FakeDevice;
use intent_test_utils::fixtures::{port_intent, port_object, port_path, site_objects};

type Store = Arc<Mutex<HashMap<String, Intent>>>;

fn load(store: &Store, target: &str) -> Intent {
    store.lock().unwrap()[target].clone()
}

fn save(store: &Store, intent: Intent) {
    store.lock().unwrap().insert(intent.target.clone(), intent);
}

fn worker(store: Store, locks: TargetLocks, device: Arc<FakeDevice>, target: String, port: String) {
    locks.with_target(&target, || {
        let mut intent = load(&store, &target);
        let renderer = StaticRenderer::default()
            .with_device("ne-1", site_objects([(port.clone(), port_object(&port, 1500))]));
        let outcome = SynchronizationEngine::new(device, Arc::new(renderer))
            .synchronize(&intent)
            .unwrap();
        assert!(outcome.report.success);
        intent.topology = outcome.topology;
        save(&store, intent);
    });
}

#[test]
fn serialized_runs_never_orphan_objects() {
    let store: Store = Arc::default();
    save(&store, port_intent("svc-1", NetworkState::Active));
    let locks = TargetLocks::new();
    let device = Arc::new(FakeDevice::new());

    let handles: Vec<_> = (1..=8)
        .map(|i| {
            let (store, locks, device) = (store.clone(), locks.clone(), device.clone());
            thread::spawn(move || worker(store, locks, device, "svc-1".to_string(), format!("1/1/{i}")))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let intent = load(&store, "svc-1");
    let ledger = CleanupLedger::restore(&intent.topology).unwrap();
    let tracked: Vec<String> = ledger.entries().map(|(_, _, e)| e.target.clone()).collect();
    assert_eq!(tracked.len(), 1);
    assert_eq!(device.configured_paths("ne-1"), tracked);
    assert_eq!(device.patches().len(), 8);
}

#[test]
fn different_targets_keep_separate_ledgers() {
    let store: Store = Arc::default();
    for target in ["svc-a", "svc-b"] {
        save(&store, port_intent(target, NetworkState::Active));
    }
    let locks = TargetLocks::new();
    let device = Arc::new(FakeDevice::new());

    let handles: Vec<_> = [("svc-a", "1/1/1"), ("svc-b", "1/1/2")]
        .into_iter()
        .map(|(target, port)| {
            let (store, locks, device) = (store.clone(), locks.clone(), device.clone());
            let (target, port) = (target.to_string(), port.to_string());
            thread::spawn(move || worker(store, locks, device, target, port))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for (target, port) in [("svc-a", "1/1/1"), ("svc-b", "1/1/2")] {
        let ledger = CleanupLedger::restore(&load(&store, target).topology).unwrap();
        let tracked: Vec<_> = ledger.entries().map(|(_, _, e)| e.target.clone()).collect();
        assert_eq!(tracked, vec![port_path(port)]);
    }
    assert_eq!(locks.len(), 2);
}
