//! Command implementations

mod audit;
mod ledger;
mod sync;

pub use audit::{run_audit, run_indicators};
pub use ledger::run_ledger;
pub use sync::run_sync;
