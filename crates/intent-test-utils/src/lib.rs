//! Shared test utilities for the intent engine workspace.
//!
//! This crate is a dev-dependency only; never published.
//!
//! # Modules
//!
//! - [`device`]: [`FakeDevice`], an in-memory [`DeviceClient`] with
//!   failure injection
//! - [`fixtures`]: intent, site object and key resolver builders
//!
//! [`DeviceClient`]: intent_restconf::DeviceClient

pub mod device;
pub mod fixtures;

pub use device::FakeDevice;
