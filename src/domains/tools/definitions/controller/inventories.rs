//! Inventory CRUD on the automation controller.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::{list_query, variables_string};
use crate::domains::tools::ToolError;
use crate::domains::tools::context::ToolContext;
use crate::domains::tools::definitions::ToolDefinition;
use crate::domains::tools::definitions::common::{
    default_page_size, pick_fields, pick_page, require_non_empty, validate_limit,
};

const INVENTORY_FIELDS: &[&str] = &[
    "id",
    "name",
    "description",
    "organization",
    "kind",
    "total_hosts",
    "host_filter",
];

// ============================================================================
// Tool Parameters
// ============================================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListInventoriesParams {
    #[schemars(description = "Maximum number of inventories to return (1-100, default: 25)")]
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[schemars(description = "Optional search string")]
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct InventoryIdParams {
    #[schemars(description = "Inventory ID")]
    pub inventory_id: u64,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateInventoryParams {
    #[schemars(description = "Inventory name")]
    pub name: String,

    #[schemars(description = "Organization ID (default: 1)")]
    #[serde(default = "default_organization")]
    pub organization_id: u64,

    #[schemars(description = "Inventory description")]
    #[serde(default)]
    pub description: String,

    #[schemars(description = "Inventory variables as a YAML/JSON string or object")]
    #[serde(default)]
    pub variables: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateInventoryParams {
    #[schemars(description = "Inventory ID")]
    pub inventory_id: u64,

    #[schemars(description = "New name")]
    #[serde(default)]
    pub name: Option<String>,

    #[schemars(description = "New description")]
    #[serde(default)]
    pub description: Option<String>,

    #[schemars(description = "New variables as a YAML/JSON string or object")]
    #[serde(default)]
    pub variables: Option<Value>,
}

fn default_organization() -> u64 {
    1
}

// ============================================================================
// Tools
// ============================================================================

pub struct ListInventoriesTool;

#[async_trait]
impl ToolDefinition for ListInventoriesTool {
    const NAME: &'static str = "list_inventories";
    const DESCRIPTION: &'static str = "List inventories on the automation controller.";
    type Params = ListInventoriesParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        let page_size = validate_limit(params.page_size);
        let query = list_query(page_size, params.search.as_deref());
        let page = ctx
            .controller()?
            .get_page("inventories/", Some(&query), page_size)
            .await?;
        Ok(pick_page(page, INVENTORY_FIELDS))
    }
}

pub struct GetInventoryTool;

#[async_trait]
impl ToolDefinition for GetInventoryTool {
    const NAME: &'static str = "get_inventory";
    const DESCRIPTION: &'static str = "Get one inventory by ID.";
    type Params = InventoryIdParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        let record = ctx
            .controller()?
            .get::<()>(&format!("inventories/{}/", params.inventory_id), None)
            .await?;
        Ok(pick_fields(&record, INVENTORY_FIELDS))
    }
}

pub struct CreateInventoryTool;

#[async_trait]
impl ToolDefinition for CreateInventoryTool {
    const NAME: &'static str = "create_inventory";
    const DESCRIPTION: &'static str = "Create an inventory in an organization.";
    type Params = CreateInventoryParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        require_non_empty("name", &params.name)?;

        let mut body = json!({
            "name": params.name,
            "organization": params.organization_id,
            "description": params.description,
        });
        if let Some(vars) = &params.variables {
            body["variables"] = Value::String(variables_string(vars));
        }

        let record = ctx.controller()?.post("inventories/", Some(&body)).await?;
        Ok(pick_fields(&record, INVENTORY_FIELDS))
    }
}

pub struct UpdateInventoryTool;

#[async_trait]
impl ToolDefinition for UpdateInventoryTool {
    const NAME: &'static str = "update_inventory";
    const DESCRIPTION: &'static str =
        "Update an inventory's name, description or variables. Only supplied fields change.";
    type Params = UpdateInventoryParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        let mut body = Map::new();
        if let Some(name) = params.name {
            require_non_empty("name", &name)?;
            body.insert("name".into(), Value::String(name));
        }
        if let Some(description) = params.description {
            body.insert("description".into(), Value::String(description));
        }
        if let Some(vars) = &params.variables {
            body.insert("variables".into(), Value::String(variables_string(vars)));
        }
        if body.is_empty() {
            return Err(ToolError::invalid_arguments(
                "at least one of name, description or variables is required",
            ));
        }

        let record = ctx
            .controller()?
            .patch(&format!("inventories/{}/", params.inventory_id), &body)
            .await?;
        Ok(pick_fields(&record, INVENTORY_FIELDS))
    }
}

pub struct DeleteInventoryTool;

#[async_trait]
impl ToolDefinition for DeleteInventoryTool {
    const NAME: &'static str = "delete_inventory";
    const DESCRIPTION: &'static str = "Delete an inventory by ID.";
    type Params = InventoryIdParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        ctx.controller()?
            .delete(&format!("inventories/{}/", params.inventory_id))
            .await?;
        Ok(json!({ "deleted": true, "inventory_id": params.inventory_id }))
    }
}
