//! Per-target serialization of reconciliation calls
//!
//! Synchronize and audit load the ledger, mutate it and persist it back into
//! the intent's topology. Two overlapping calls for the same target would
//! race on that ledger, so callers that may run concurrently take the
//! target's lock around each call. Different targets never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// One mutex per intent target
#[derive(Debug, Clone, Default)]
pub struct TargetLocks {
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl TargetLocks {
    /// Create an empty lock table
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock guarding `target`, created on first use
    pub fn lock_for(&self, target: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(target.to_string()).or_default())
    }

    /// Run `f` while holding the lock for `target`
    pub fn with_target<T>(&self, target: &str, f: impl FnOnce() -> T) -> T {
        let lock = self.lock_for(target);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::trace!(%target, "Acquired target lock");
        f()
    }

    /// Number of targets seen so far
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `true` when no target has been locked yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
