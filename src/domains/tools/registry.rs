//! Tool Registry - listing and name-based dispatch over the enabled toolsets.
//!
//! The STDIO transport goes through the rmcp router; the HTTP transport
//! calls [`ToolRegistry::call_tool`]. Both read the same toolset lists.

use std::sync::Arc;

use rmcp::model::{CallToolResult, JsonObject, Tool};
use tracing::warn;

use super::ToolError;
use super::context::ToolContext;
use super::definitions::{controller, docs, eda, galaxy, lint};
use crate::core::config::Toolset;

/// Tool registry over the toolsets enabled in the configuration.
#[derive(Clone)]
pub struct ToolRegistry {
    ctx: Arc<ToolContext>,
}

impl ToolRegistry {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }

    fn enabled(&self) -> impl Iterator<Item = Toolset> + '_ {
        self.ctx.config().toolsets.iter().copied()
    }

    /// Names of every enabled tool.
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.enabled().flat_map(toolset_names).collect()
    }

    /// Metadata of every enabled tool.
    pub fn get_all_tools(&self) -> Vec<Tool> {
        self.enabled().flat_map(toolset_tools).collect()
    }

    /// Run a tool by name.
    ///
    /// Tool failures come back as error-shaped results; only an unknown or
    /// disabled tool name is an `Err`.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: JsonObject,
    ) -> Result<CallToolResult, ToolError> {
        let Some(toolset) = self
            .enabled()
            .find(|toolset| toolset_names(*toolset).contains(&name))
        else {
            warn!("Unknown tool requested: {}", name);
            return Err(ToolError::not_found(name));
        };

        let ctx = self.ctx.as_ref();
        let result = match toolset {
            Toolset::Controller => controller::call(name, ctx, arguments).await,
            Toolset::Eda => eda::call(name, ctx, arguments).await,
            Toolset::Galaxy => galaxy::call(name, ctx, arguments).await,
            Toolset::Lint => lint::call(name, ctx, arguments).await,
            Toolset::Docs => docs::call(name, ctx, arguments).await,
        };
        result.ok_or_else(|| ToolError::not_found(name))
    }
}

fn toolset_names(toolset: Toolset) -> Vec<&'static str> {
    match toolset {
        Toolset::Controller => controller::names(),
        Toolset::Eda => eda::names(),
        Toolset::Galaxy => galaxy::names(),
        Toolset::Lint => lint::names(),
        Toolset::Docs => docs::names(),
    }
}

fn toolset_tools(toolset: Toolset) -> Vec<Tool> {
    match toolset {
        Toolset::Controller => controller::tools(),
        Toolset::Eda => eda::tools(),
        Toolset::Galaxy => galaxy::tools(),
        Toolset::Lint => lint::tools(),
        Toolset::Docs => docs::tools(),
    }
}
