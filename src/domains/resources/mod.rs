//! Resources domain module.
//!
//! Resources are read-only JSON documents describing how this server is set
//! up: the effective configuration (without credentials) and the
//! documentation domain allow-list.
//!
//! A resource is a [`ResourceDefinition`] in `definitions/`, listed once in
//! `registry.rs`; `service.rs` serves whatever the registry returns.

pub mod definitions;
mod error;
mod registry;
mod service;

pub use definitions::ResourceDefinition;
pub use error::ResourceError;
pub use registry::{ResourceEntry, get_all_resources, resource_uris};
pub use service::ResourceService;
