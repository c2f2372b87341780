//! Reconciliation and audit engine for declarative network intents
//!
//! - [`CleanupLedger`]: per-device record of applied `replace` objects,
//!   persisted in the intent's topology between runs
//! - [`SynchronizationEngine`]: pushes rendered configuration to devices,
//!   removes objects no longer rendered, tolerates per-device failure
//! - [`AuditOrchestrator`]: reads devices back and reports drift
//! - [`SiteRenderer`] / [`ResourceReleaser`]: seams to the renderer and
//!   the resource pools
//! - [`TargetLocks`]: serializes calls for the same intent target
//! - [`EngineConfig`]: TOML configuration

pub mod audit;
pub mod config;
pub mod error;
pub mod ledger;
pub mod locks;
pub mod render;
pub mod sync;

pub use audit::{AuditOrchestrator, Indicators};
pub use config::{EngineConfig, EngineSettings};
pub use error::{Error, Result};
pub use ledger::{CleanupEntry, CleanupLedger, LEDGER_KEY};
pub use locks::TargetLocks;
pub use render::{ResourceReleaser, SiteRenderer, StaticRenderer};
pub use sync::{SyncOutcome, SyncReport, SynchronizationEngine};
