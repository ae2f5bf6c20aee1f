//! Resource service implementation.
//!
//! Lists the registered resources and renders them on read. Content is
//! computed from the configuration each time, so nothing is cached.

use std::collections::HashMap;
use std::sync::Arc;

use rmcp::model::{ReadResourceResult, Resource, ResourceContents};
use tracing::{debug, info};

use super::error::ResourceError;
use super::registry::{ResourceEntry, get_all_resources};
use crate::core::config::Config;

/// Service for listing and reading resources.
pub struct ResourceService {
    config: Arc<Config>,

    /// Key: resource URI.
    resources: HashMap<String, ResourceEntry>,
}

impl ResourceService {
    pub fn new(config: Arc<Config>) -> Self {
        let resources: HashMap<_, _> = get_all_resources()
            .into_iter()
            .map(|entry| (entry.resource.raw.uri.clone(), entry))
            .collect();
        info!("Registered {} resources", resources.len());

        Self { config, resources }
    }

    /// List all available resources, ordered by URI.
    pub async fn list_resources(&self) -> Vec<Resource> {
        let mut resources: Vec<Resource> = self
            .resources
            .values()
            .map(|entry| entry.resource.clone())
            .collect();
        resources.sort_by(|a, b| a.raw.uri.cmp(&b.raw.uri));
        resources
    }

    /// Read a resource by URI as pretty-printed JSON text.
    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, ResourceError> {
        let entry = self
            .resources
            .get(uri)
            .ok_or_else(|| ResourceError::not_found(uri))?;
        debug!("Reading resource {}", uri);

        let value = (entry.read)(&self.config)?;
        let text = serde_json::to_string_pretty(&value)?;

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, uri)],
        })
    }
}
