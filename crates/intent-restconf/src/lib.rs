//! RESTCONF device access for the intent engine
//!
//! This crate is the engine's only window onto the network:
//!
//! - [`DeviceClient`]: read configuration and state, apply YANG patches
//! - [`PatchRequest`]: the RFC 8072 patch envelope and its error report
//! - [`DeviceError`]: connectivity, HTTP status and patch-semantic failures
//! - [`HttpDeviceClient`]: blocking `reqwest` implementation against a
//!   controller's device mount
//! - [`HttpSchemaKeySource`]: list key lookups for the comparator
//! - [`MisalignmentResolver`]: the controller's approved-misalignment service
//!
//! Calls are blocking request/response with a bounded timeout. A `404` on a
//! read means "not configured" and surfaces as `Ok(None)`.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod patch;
pub mod resolver;
pub mod schema;

pub use client::DeviceClient;
pub use config::{ResolverConfig, RestconfConfig, SchemaConfig};
pub use error::{DeviceError, Result, describe_status};
pub use http::HttpDeviceClient;
pub use patch::{PatchEdit, PatchError, PatchRequest, parse_patch_errors};
pub use resolver::{HttpMisalignmentResolver, MisalignmentResolver, SynchronizeResolution};
pub use schema::HttpSchemaKeySource;
