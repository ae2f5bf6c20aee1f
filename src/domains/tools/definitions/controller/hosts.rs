//! Host listing and creation.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{list_query, variables_string};
use crate::domains::tools::ToolError;
use crate::domains::tools::context::ToolContext;
use crate::domains::tools::definitions::ToolDefinition;
use crate::domains::tools::definitions::common::{
    default_page_size, pick_fields, pick_page, require_non_empty, validate_limit,
};

const HOST_FIELDS: &[&str] = &[
    "id",
    "name",
    "description",
    "inventory",
    "enabled",
    "variables",
];

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListHostsParams {
    #[schemars(description = "Only hosts of this inventory (optional)")]
    #[serde(default)]
    pub inventory_id: Option<u64>,

    #[schemars(description = "Maximum number of hosts to return (1-100, default: 25)")]
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[schemars(description = "Optional search string")]
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateHostParams {
    #[schemars(description = "Inventory the host is added to")]
    pub inventory_id: u64,

    #[schemars(description = "Host name or address")]
    pub name: String,

    #[schemars(description = "Host description")]
    #[serde(default)]
    pub description: String,

    #[schemars(description = "Host variables as a YAML/JSON string or object")]
    #[serde(default)]
    pub variables: Option<Value>,
}

pub struct ListHostsTool;

#[async_trait]
impl ToolDefinition for ListHostsTool {
    const NAME: &'static str = "list_hosts";
    const DESCRIPTION: &'static str =
        "List hosts, optionally restricted to one inventory.";
    type Params = ListHostsParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        let page_size = validate_limit(params.page_size);
        let path = match params.inventory_id {
            Some(id) => format!("inventories/{id}/hosts/"),
            None => "hosts/".to_string(),
        };
        let query = list_query(page_size, params.search.as_deref());
        let page = ctx
            .controller()?
            .get_page(&path, Some(&query), page_size)
            .await?;
        Ok(pick_page(page, HOST_FIELDS))
    }
}

pub struct CreateHostTool;

#[async_trait]
impl ToolDefinition for CreateHostTool {
    const NAME: &'static str = "create_host";
    const DESCRIPTION: &'static str = "Add a host to an inventory.";
    type Params = CreateHostParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        require_non_empty("name", &params.name)?;

        let mut body = json!({
            "name": params.name,
            "description": params.description,
            "inventory": params.inventory_id,
        });
        if let Some(vars) = &params.variables {
            body["variables"] = Value::String(variables_string(vars));
        }

        let record = ctx
            .controller()?
            .post(
                &format!("inventories/{}/hosts/", params.inventory_id),
                Some(&body),
            )
            .await?;
        Ok(pick_fields(&record, HOST_FIELDS))
    }
}
