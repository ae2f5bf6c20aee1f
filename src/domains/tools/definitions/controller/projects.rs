//! Projects and SCM syncs.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use super::list_query;
use crate::domains::tools::ToolError;
use crate::domains::tools::context::ToolContext;
use crate::domains::tools::definitions::ToolDefinition;
use crate::domains::tools::definitions::common::{default_page_size, pick_page, validate_limit};

const PROJECT_FIELDS: &[&str] = &[
    "id",
    "name",
    "scm_type",
    "scm_url",
    "scm_branch",
    "status",
];

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListProjectsParams {
    #[schemars(description = "Maximum number of projects to return (1-100, default: 25)")]
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[schemars(description = "Optional search string")]
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ProjectIdParams {
    #[schemars(description = "Project ID")]
    pub project_id: u64,
}

pub struct ListProjectsTool;

#[async_trait]
impl ToolDefinition for ListProjectsTool {
    const NAME: &'static str = "list_projects";
    const DESCRIPTION: &'static str = "List projects on the automation controller.";
    type Params = ListProjectsParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        let page_size = validate_limit(params.page_size);
        let query = list_query(page_size, params.search.as_deref());
        let page = ctx
            .controller()?
            .get_page("projects/", Some(&query), page_size)
            .await?;
        Ok(pick_page(page, PROJECT_FIELDS))
    }
}

pub struct SyncProjectTool;

#[async_trait]
impl ToolDefinition for SyncProjectTool {
    const NAME: &'static str = "sync_project";
    const DESCRIPTION: &'static str = "Start an SCM update of a project.";
    type Params = ProjectIdParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        let update = ctx
            .controller()?
            .post::<Value>(&format!("projects/{}/update/", params.project_id), None)
            .await?;

        let update_id = update
            .get("project_update")
            .filter(|v| !v.is_null())
            .or_else(|| update.get("id"))
            .cloned()
            .unwrap_or(Value::Null);

        Ok(json!({
            "project_id": params.project_id,
            "update_id": update_id,
            "status": update.get("status").cloned().unwrap_or_else(|| json!("pending")),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::UpstreamConfig;
    use crate::domains::tools::definitions::invoke;
    use crate::domains::tools::definitions::testing::{args, context, serve, structured};
    use axum::{
        Json, Router,
        http::StatusCode,
        routing::{get, post},
    };

    #[tokio::test]
    async fn test_list_projects_picks_scm_fields() {
        async fn projects() -> Json<Value> {
            Json(json!({
                "count": 1,
                "results": [{
                    "id": 4, "name": "playbooks", "scm_type": "git",
                    "scm_url": "https://git.example/playbooks.git", "scm_branch": "main",
                    "status": "successful", "credential": 3
                }]
            }))
        }
        let base = serve(Router::new().route("/c/projects/", get(projects))).await;
        let ctx = context(|c| c.controller = UpstreamConfig::new(format!("{base}/c"), None));

        let result = invoke::<ListProjectsTool>(&ctx, args(json!({}))).await;
        let value = structured(&result);
        assert_eq!(value["results"][0]["scm_branch"], "main");
        assert!(value["results"][0].get("credential").is_none());
    }

    #[tokio::test]
    async fn test_sync_project() {
        async fn update() -> (StatusCode, Json<Value>) {
            (
                StatusCode::ACCEPTED,
                Json(json!({"project_update": 31, "status": "pending"})),
            )
        }
        let base = serve(Router::new().route("/c/projects/{id}/update/", post(update))).await;
        let ctx = context(|c| c.controller = UpstreamConfig::new(format!("{base}/c"), None));

        let result = invoke::<SyncProjectTool>(&ctx, args(json!({"project_id": 4}))).await;
        assert_eq!(
            structured(&result),
            json!({"project_id": 4, "update_id": 31, "status": "pending"})
        );
    }
}
