//! Tools domain module.
//!
//! Tools are executable functions MCP clients call to reach the automation
//! controller, Event-Driven Ansible, Galaxy, the linter and the Red Hat
//! documentation site.
//!
//! ## Architecture
//!
//! - `definitions/` - Tool implementations, one module per toolset
//! - `context.rs` - Shared configuration and upstream clients
//! - `router.rs` - rmcp ToolRouter builder for the STDIO transport
//! - `registry.rs` - Name-based listing and dispatch for the HTTP transport
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Implement `ToolDefinition` for a unit struct in the toolset's module
//! 2. Add the struct to that module's `toolset!` list
//!
//! Router and registry pick it up from the toolset.

pub mod context;
pub mod definitions;
pub mod error;
mod registry;
pub mod router;

pub use context::ToolContext;
pub use error::ToolError;
pub use registry::ToolRegistry;
pub use router::build_tool_router;
