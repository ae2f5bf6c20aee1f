//! Rulebook activations.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::domains::tools::ToolError;
use crate::domains::tools::context::ToolContext;
use crate::domains::tools::definitions::ToolDefinition;
use crate::domains::tools::definitions::common::{
    default_page_size, one_of, pick_fields, pick_page, require_non_empty, validate_limit,
};

const ACTIVATION_FIELDS: &[&str] = &[
    "id",
    "name",
    "description",
    "is_enabled",
    "status",
    "restart_policy",
    "restart_count",
    "rulebook_name",
    "project_id",
    "rulebook_id",
    "decision_environment_id",
    "organization_id",
    "created_at",
    "modified_at",
];

/// Accepted values for `restart_policy`.
pub const RESTART_POLICIES: &[&str] = &["always", "on-failure", "never"];

// ============================================================================
// Tool Parameters
// ============================================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListActivationsParams {
    #[schemars(description = "Maximum number of activations to return (1-100, default: 25)")]
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[schemars(description = "Filter by activation name")]
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ActivationIdParams {
    #[schemars(description = "Activation ID")]
    pub activation_id: u64,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateActivationParams {
    #[schemars(description = "Activation name")]
    pub name: String,

    #[schemars(description = "EDA project ID")]
    pub project_id: u64,

    #[schemars(description = "Rulebook ID")]
    pub rulebook_id: u64,

    #[schemars(description = "Decision environment ID")]
    pub decision_environment_id: u64,

    #[schemars(description = "Organization ID (default: 1)")]
    #[serde(default = "default_organization")]
    pub organization_id: u64,

    #[schemars(description = "Activation description")]
    #[serde(default)]
    pub description: String,

    #[schemars(description = "Extra variables as a YAML string")]
    #[serde(default)]
    pub extra_var: Option<String>,

    #[schemars(description = "Restart policy: always, on-failure or never (default: on-failure)")]
    #[serde(default = "default_restart_policy")]
    pub restart_policy: String,

    #[schemars(description = "Start the activation right away (default: true)")]
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
}

fn default_organization() -> u64 {
    1
}

fn default_restart_policy() -> String {
    "on-failure".to_string()
}

fn default_enabled() -> bool {
    true
}

// ============================================================================
// Tools
// ============================================================================

pub struct ListActivationsTool;

#[async_trait]
impl ToolDefinition for ListActivationsTool {
    const NAME: &'static str = "list_activations";
    const DESCRIPTION: &'static str = "List rulebook activations.";
    type Params = ListActivationsParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        let page_size = validate_limit(params.page_size);
        let mut query = vec![("page_size", page_size.to_string())];
        if let Some(name) = params.name.filter(|n| !n.trim().is_empty()) {
            query.push(("name", name));
        }
        let page = ctx
            .eda()?
            .get_page("activations/", Some(&query), page_size)
            .await?;
        Ok(pick_page(page, ACTIVATION_FIELDS))
    }
}

pub struct GetActivationTool;

#[async_trait]
impl ToolDefinition for GetActivationTool {
    const NAME: &'static str = "get_activation";
    const DESCRIPTION: &'static str = "Get one rulebook activation by ID.";
    type Params = ActivationIdParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        let record = ctx
            .eda()?
            .get::<()>(&format!("activations/{}/", params.activation_id), None)
            .await?;
        Ok(pick_fields(&record, ACTIVATION_FIELDS))
    }
}

pub struct CreateActivationTool;

#[async_trait]
impl ToolDefinition for CreateActivationTool {
    const NAME: &'static str = "create_activation";
    const DESCRIPTION: &'static str =
        "Create a rulebook activation from a project, rulebook and decision environment.";
    type Params = CreateActivationParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        require_non_empty("name", &params.name)?;
        one_of("restart_policy", &params.restart_policy, RESTART_POLICIES)?;

        let mut body = json!({
            "name": params.name,
            "description": params.description,
            "project_id": params.project_id,
            "rulebook_id": params.rulebook_id,
            "decision_environment_id": params.decision_environment_id,
            "organization_id": params.organization_id,
            "restart_policy": params.restart_policy,
            "is_enabled": params.is_enabled,
        });
        if let Some(extra_var) = params.extra_var.filter(|v| !v.trim().is_empty()) {
            body["extra_var"] = Value::String(extra_var);
        }

        let record = ctx.eda()?.post("activations/", Some(&body)).await?;
        Ok(pick_fields(&record, ACTIVATION_FIELDS))
    }
}

/// POST an action sub-path of an activation.
async fn activation_action(
    ctx: &ToolContext,
    activation_id: u64,
    action: &str,
) -> Result<Value, ToolError> {
    ctx.eda()?
        .post::<Value>(&format!("activations/{activation_id}/{action}/"), None)
        .await?;
    Ok(json!({
        "activation_id": activation_id,
        "action": action,
        "accepted": true,
    }))
}

pub struct EnableActivationTool;

#[async_trait]
impl ToolDefinition for EnableActivationTool {
    const NAME: &'static str = "enable_activation";
    const DESCRIPTION: &'static str = "Enable (start) a rulebook activation.";
    type Params = ActivationIdParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        activation_action(ctx, params.activation_id, "enable").await
    }
}

pub struct DisableActivationTool;

#[async_trait]
impl ToolDefinition for DisableActivationTool {
    const NAME: &'static str = "disable_activation";
    const DESCRIPTION: &'static str = "Disable (stop) a rulebook activation.";
    type Params = ActivationIdParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        activation_action(ctx, params.activation_id, "disable").await
    }
}

pub struct RestartActivationTool;

#[async_trait]
impl ToolDefinition for RestartActivationTool {
    const NAME: &'static str = "restart_activation";
    const DESCRIPTION: &'static str = "Restart a rulebook activation.";
    type Params = ActivationIdParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        activation_action(ctx, params.activation_id, "restart").await
    }
}

pub struct DeleteActivationTool;

#[async_trait]
impl ToolDefinition for DeleteActivationTool {
    const NAME: &'static str = "delete_activation";
    const DESCRIPTION: &'static str = "Delete a rulebook activation.";
    type Params = ActivationIdParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        ctx.eda()?
            .delete(&format!("activations/{}/", params.activation_id))
            .await?;
        Ok(json!({ "deleted": true, "activation_id": params.activation_id }))
    }
}
