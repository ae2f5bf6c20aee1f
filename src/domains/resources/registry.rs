//! Resource Registry - central registration of all resources.
//!
//! When adding a new resource:
//! 1. Create the resource file in `definitions/`
//! 2. Export it in `definitions/mod.rs`
//! 3. Register it here in `get_all_resources()`

use rmcp::model::{AnnotateAble, RawResource, Resource};
use serde_json::Value;

use super::ResourceError;
use super::definitions::{AllowedDomainsResource, ResourceDefinition, ServerInfoResource};
use crate::core::config::Config;

/// Renders a resource's JSON body from the configuration.
pub type ResourceReader = fn(&Config) -> Result<Value, ResourceError>;

/// A registered resource: its listing metadata and its reader.
#[derive(Clone)]
pub struct ResourceEntry {
    pub resource: Resource,
    pub read: ResourceReader,
}

fn build_resource<R: ResourceDefinition>() -> ResourceEntry {
    let mut raw = RawResource::new(R::URI, R::NAME);
    raw.description = Some(R::DESCRIPTION.to_string());
    raw.mime_type = Some(R::MIME_TYPE.to_string());

    ResourceEntry {
        resource: raw.no_annotation(),
        read: R::read,
    }
}

/// Get all registered resources.
pub fn get_all_resources() -> Vec<ResourceEntry> {
    vec![
        build_resource::<ServerInfoResource>(),
        build_resource::<AllowedDomainsResource>(),
    ]
}

/// Get the list of all resource URIs.
pub fn resource_uris() -> Vec<&'static str> {
    vec![ServerInfoResource::URI, AllowedDomainsResource::URI]
}
