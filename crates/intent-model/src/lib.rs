//! Data model for declarative network intents
//!
//! This crate holds the plain data exchanged between the reconciliation
//! engine and its collaborators:
//!
//! - **Intent**: the desired-state record for one target, with its topology
//! - **Topology**: objects currently believed present on devices, plus the
//!   free-form `extra-info` map the engine uses to persist housekeeping state
//! - **Site objects**: per-device configuration fragments produced by the
//!   external renderer
//! - **Audit report**: misaligned attributes and objects found by an audit
//!
//! Everything here is `serde`-serializable in the JSON shapes the
//! surrounding controller exchanges.

pub mod error;
pub mod intent;
pub mod report;
pub mod site;
pub mod topology;

pub use error::{Error, Result};
pub use intent::{Intent, NetworkState};
pub use report::{AuditReport, MisAlignedAttribute, MisAlignedObject};
pub use site::{ConfigBlock, PatchOperation, SiteObject, SiteObjects, StateAssertion};
pub use topology::{Topology, TopologyObject};
