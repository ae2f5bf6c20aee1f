//! Resource definitions module.
//!
//! Each resource is defined in its own file with its URI, metadata and a
//! `read` function that renders the current configuration as JSON.

mod allowed_domains;
mod server_info;

pub use allowed_domains::AllowedDomainsResource;
pub use server_info::ServerInfoResource;

use serde_json::Value;

use super::ResourceError;
use crate::core::config::Config;

/// Trait for resource definitions.
///
/// Each resource must implement this trait to provide its metadata and content.
pub trait ResourceDefinition {
    /// The unique URI of the resource.
    const URI: &'static str;

    /// The display name of the resource.
    const NAME: &'static str;

    /// A description of the resource.
    const DESCRIPTION: &'static str;

    /// The MIME type of the resource content.
    const MIME_TYPE: &'static str = "application/json";

    /// Render the resource for the given configuration.
    fn read(config: &Config) -> Result<Value, ResourceError>;
}
