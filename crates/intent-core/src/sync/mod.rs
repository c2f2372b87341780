//! Synchronization of rendered site objects onto devices
//!
//! One synchronize call restores the cleanup ledger, builds a working set of
//! edits per device (ledger rollbacks overlaid with freshly rendered config
//! blocks), applies one patch per device, and persists the updated ledger.
//! Devices fail independently: a failed device keeps its previous ledger
//! entries and is reported, while the others proceed.

mod engine;
mod report;

pub use engine::SynchronizationEngine;
pub use report::{SyncOutcome, SyncReport};
