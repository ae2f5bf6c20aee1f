//! Ansible MCP Server Library
//!
//! A Model Context Protocol (MCP) server that exposes Ansible automation
//! services as tools: the automation controller, Event-Driven Ansible,
//! Galaxy, `ansible-lint` and Red Hat product documentation.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, upstream HTTP client, security
//!   helpers, the server handler and the transports
//! - **domains**: business logic organized by bounded contexts
//!   - **tools**: one toolset per upstream, enabled through `MCP_TOOLSETS`
//!   - **resources**: server info and the documentation domain allow-list
//!
//! # Example
//!
//! ```rust,no_run
//! use ansible_mcp_server::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let transport = TransportService::new(config.transport.clone());
//!     transport.run(McpServer::new(config)).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

pub use core::{Config, Error, McpServer, Result};
