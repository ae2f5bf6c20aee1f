//! Core module containing shared infrastructure components.
//!
//! Configuration, error handling, the upstream HTTP client, security
//! helpers, server lifecycle and the transport layer live here.

pub mod config;
pub mod error;
pub mod security;
pub mod server;
pub mod transport;
pub mod upstream;

pub use config::{Config, Toolset};
pub use error::{Error, Result};
pub use security::{DomainPolicy, PathSecurityError, validate_dir, validate_path};
pub use server::McpServer;
pub use transport::{TransportConfig, TransportService};
pub use upstream::{Auth, RawResponse, UpstreamClient};
