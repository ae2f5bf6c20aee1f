//! MCP Server implementation and lifecycle management.
//!
//! This module contains the main server handler that implements the MCP
//! protocol by delegating to domain-specific services.
//!
//! ## Tool Architecture
//!
//! Tools are defined in `domains/tools/definitions/`, grouped by toolset.
//! The STDIO transport dispatches through the rmcp `ToolRouter` built in
//! `domains/tools/router.rs`; the HTTP transport goes through the
//! `ToolRegistry`. Both only see the toolsets enabled in the configuration.

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, handler::server::tool::ToolRouter, model::*,
    service::RequestContext, tool_handler,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::config::Config;
use crate::domains::resources::{ResourceError, ResourceService};
use crate::domains::tools::{ToolContext, ToolError, ToolRegistry, build_tool_router};

const INSTRUCTIONS: &str = "Tools for Ansible automation: job templates, jobs and inventories \
     on the automation controller, Event-Driven Ansible activations, Galaxy content search, \
     ansible-lint checks and Red Hat product documentation. Only the toolsets enabled on this \
     server are listed. Resources describe the server setup and the allowed documentation domains.";

/// The main MCP server handler.
///
/// This struct implements the `ServerHandler` trait from rmcp and coordinates
/// between the tool and resource services.
#[derive(Clone)]
pub struct McpServer {
    /// Shared configuration and upstream clients.
    ctx: Arc<ToolContext>,

    /// Name-based tool dispatch (HTTP transport).
    registry: ToolRegistry,

    /// Service for handling resource-related requests.
    resource_service: Arc<ResourceService>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let ctx = Arc::new(ToolContext::new(config.clone()));

        Self {
            tool_router: build_tool_router::<Self>(&ctx),
            registry: ToolRegistry::new(ctx.clone()),
            resource_service: Arc::new(ResourceService::new(config)),
            ctx,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.ctx.config().server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.ctx.config().server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Config {
        self.ctx.config()
    }

    /// Server instructions sent on initialize.
    pub fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all enabled tools.
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.registry
            .get_all_tools()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name.
    ///
    /// Tool failures are returned as error-shaped results; only an unknown
    /// tool name is an `Err`.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: JsonObject,
    ) -> Result<CallToolResult, ToolError> {
        self.registry.call_tool(name, arguments).await
    }

    /// List all available resources.
    pub async fn list_resources(&self) -> Vec<serde_json::Value> {
        let resources = self.resource_service.list_resources().await;

        resources
            .into_iter()
            .map(|r| {
                serde_json::json!({
                    "uri": r.uri,
                    "name": r.name,
                    "description": r.description,
                    "mimeType": r.mime_type
                })
            })
            .collect()
    }

    /// Read a resource by URI.
    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, ResourceError> {
        self.resource_service.read_resource(uri).await
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    #[instrument(skip(self, _context))]
    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        info!("Listing resources");
        let resources = self.resource_service.list_resources().await;
        Ok(ListResourcesResult {
            resources,
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, _context))]
    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        info!("Reading resource: {}", request.uri);
        self.resource_service
            .read_resource(&request.uri)
            .await
            .map_err(|e| match e {
                ResourceError::NotFound(_) => McpError::resource_not_found(e.to_string(), None),
                other => McpError::internal_error(other.to_string(), None),
            })
    }
}
