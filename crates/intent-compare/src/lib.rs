//! Configuration and state comparison for declarative intents
//!
//! This crate decides whether a device matches what an intent asked for:
//!
//! - **equivalence**: scalar comparison with type coercion and IPv6
//!   canonicalisation
//! - **keys**: YANG list key lookup with a process-wide memo cache
//! - **config**: recursive intended-vs-actual tree diff with key-grouped
//!   list comparison and undesired/missing classification
//! - **state**: health assertions evaluated against device state
//! - **query**: the small path-query language used by health assertions
//!   and indicators
//!
//! Nothing here performs I/O. Schema lookups go through the
//! [`SchemaKeySource`] trait so the comparators stay unit-testable.

pub mod config;
pub mod equivalence;
pub mod error;
pub mod keys;
pub mod path;
pub mod query;
pub mod state;

pub use config::{CompareScope, ConfigComparator, unwrap_container};
pub use equivalence::{ValueKind, coerce, is_address, normalize_address, scalars_equal, value_text};
pub use error::{Error, Result};
pub use keys::{KeyCache, ListKeyResolver, SchemaKeySource, StaticKeySource};
pub use query::{Query, query};
pub use state::{StateCheck, compare_state};
