//! Tool definitions module.
//!
//! Tools are grouped by upstream into toolsets. Every tool is a unit struct
//! implementing [`ToolDefinition`]; each toolset module lists its tools once
//! through the `toolset!` macro, which generates the name list, the rmcp
//! routes and the name-based dispatch used by the HTTP transport.

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, JsonObject, Tool},
};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use super::context::ToolContext;
use super::error::ToolError;
use common::{error_result, success_result};

/// One callable tool: a name, a description, a parameter type and the
/// request it performs.
#[async_trait]
pub trait ToolDefinition: Send + Sync + 'static {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    /// Arguments, decoded from the call's JSON object.
    type Params: DeserializeOwned + JsonSchema + Send + 'static;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError>;

    /// Tool metadata advertised to clients.
    fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<Self::Params>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

/// Decode arguments, run the tool and shape the outcome as a tool result.
///
/// Decoding failures and tool errors both become error results; nothing is
/// raised to the protocol layer.
pub async fn invoke<T: ToolDefinition>(ctx: &ToolContext, args: JsonObject) -> CallToolResult {
    info!(tool = T::NAME, "Tool call");

    let params = match serde_json::from_value::<T::Params>(Value::Object(args)) {
        Ok(params) => params,
        Err(e) => return error_result(T::NAME, &ToolError::invalid_arguments(e.to_string())),
    };

    match T::run(ctx, params).await {
        Ok(value) => success_result(value),
        Err(e) => error_result(T::NAME, &e),
    }
}

/// Create a ToolRoute for the STDIO transport.
pub fn tool_route<T, S>(ctx: Arc<ToolContext>) -> ToolRoute<S>
where
    T: ToolDefinition,
    S: Send + Sync + 'static,
{
    ToolRoute::new_dyn(T::to_tool(), move |call: ToolCallContext<'_, S>| {
        let args = call.arguments.clone().unwrap_or_default();
        let ctx = ctx.clone();
        async move { Ok::<_, McpError>(invoke::<T>(&ctx, args).await) }.boxed()
    })
}

/// Generates `names`, `tools`, `routes` and `call` for a list of tools.
macro_rules! toolset {
    ($($tool:ty),+ $(,)?) => {
        /// Names of every tool in this toolset.
        pub fn names() -> Vec<&'static str> {
            use $crate::domains::tools::definitions::ToolDefinition;
            vec![$(<$tool>::NAME),+]
        }

        /// Tool metadata for every tool in this toolset.
        pub fn tools() -> Vec<rmcp::model::Tool> {
            use $crate::domains::tools::definitions::ToolDefinition;
            vec![$(<$tool>::to_tool()),+]
        }

        /// rmcp routes for every tool in this toolset.
        pub fn routes<S>(
            ctx: &std::sync::Arc<$crate::domains::tools::context::ToolContext>,
        ) -> Vec<rmcp::handler::server::tool::ToolRoute<S>>
        where
            S: Send + Sync + 'static,
        {
            vec![$($crate::domains::tools::definitions::tool_route::<$tool, S>(ctx.clone())),+]
        }

        /// Dispatch by name; `None` when the name is not in this toolset.
        pub async fn call(
            name: &str,
            ctx: &$crate::domains::tools::context::ToolContext,
            args: rmcp::model::JsonObject,
        ) -> Option<rmcp::model::CallToolResult> {
            use $crate::domains::tools::definitions::ToolDefinition;
            $(
                if name == <$tool>::NAME {
                    return Some($crate::domains::tools::definitions::invoke::<$tool>(ctx, args).await);
                }
            )+
            None
        }
    };
}

pub mod common;
pub mod controller;
pub mod docs;
pub mod eda;
pub mod galaxy;
pub mod lint;

#[cfg(test)]
pub(crate) mod testing;
