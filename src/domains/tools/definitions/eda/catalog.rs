//! Read-only EDA listings: rulebooks, projects and decision environments.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use crate::domains::tools::ToolError;
use crate::domains::tools::context::ToolContext;
use crate::domains::tools::definitions::ToolDefinition;
use crate::domains::tools::definitions::common::{default_page_size, pick_page, validate_limit};

const RULEBOOK_FIELDS: &[&str] = &["id", "name", "description", "project_id", "organization_id"];
const PROJECT_FIELDS: &[&str] = &["id", "name", "description", "url", "scm_branch", "import_state"];
const DE_FIELDS: &[&str] = &["id", "name", "description", "image_url", "organization_id"];

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListRulebooksParams {
    #[schemars(description = "Only rulebooks of this EDA project")]
    #[serde(default)]
    pub project_id: Option<u64>,

    #[schemars(description = "Maximum number of rulebooks to return (1-100, default: 25)")]
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PageSizeParams {
    #[schemars(description = "Maximum number of records to return (1-100, default: 25)")]
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

async fn list(
    ctx: &ToolContext,
    path: &str,
    query: Vec<(&'static str, String)>,
    page_size: usize,
    fields: &[&str],
) -> Result<Value, ToolError> {
    let page = ctx.eda()?.get_page(path, Some(&query), page_size).await?;
    Ok(pick_page(page, fields))
}

pub struct ListRulebooksTool;

#[async_trait]
impl ToolDefinition for ListRulebooksTool {
    const NAME: &'static str = "list_rulebooks";
    const DESCRIPTION: &'static str = "List rulebooks, optionally for one EDA project.";
    type Params = ListRulebooksParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        let page_size = validate_limit(params.page_size);
        let mut query = vec![("page_size", page_size.to_string())];
        if let Some(project_id) = params.project_id {
            query.push(("project_id", project_id.to_string()));
        }
        list(ctx, "rulebooks/", query, page_size, RULEBOOK_FIELDS).await
    }
}

pub struct ListEdaProjectsTool;

#[async_trait]
impl ToolDefinition for ListEdaProjectsTool {
    const NAME: &'static str = "list_eda_projects";
    const DESCRIPTION: &'static str = "List EDA projects.";
    type Params = PageSizeParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        let page_size = validate_limit(params.page_size);
        let query = vec![("page_size", page_size.to_string())];
        list(ctx, "projects/", query, page_size, PROJECT_FIELDS).await
    }
}

pub struct ListDecisionEnvironmentsTool;

#[async_trait]
impl ToolDefinition for ListDecisionEnvironmentsTool {
    const NAME: &'static str = "list_decision_environments";
    const DESCRIPTION: &'static str = "List decision environments (execution images for rulebooks).";
    type Params = PageSizeParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        let page_size = validate_limit(params.page_size);
        let query = vec![("page_size", page_size.to_string())];
        list(ctx, "decision-environments/", query, page_size, DE_FIELDS).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::UpstreamConfig;
    use crate::domains::tools::definitions::invoke;
    use crate::domains::tools::definitions::testing::{args, context, serve, structured};
    use axum::{Json, Router, extract::Query, routing::get};
    use serde_json::json;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_rulebooks_filtered_by_project() {
        async fn rulebooks(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
            let project = q.get("project_id").cloned().unwrap_or_default();
            Json(json!({
                "count": 1,
                "results": [{"id": 5, "name": "hello.yml", "project_id": project}]
            }))
        }
        let base = serve(Router::new().route("/eda/rulebooks/", get(rulebooks))).await;
        let ctx = context(|c| c.eda = UpstreamConfig::new(format!("{base}/eda"), None));

        let result = invoke::<ListRulebooksTool>(&ctx, args(json!({"project_id": 9}))).await;
        let value = structured(&result);
        assert_eq!(value["results"][0]["project_id"], "9");
    }

    #[tokio::test]
    async fn test_decision_environments() {
        async fn des() -> Json<Value> {
            Json(json!({
                "count": 1,
                "results": [{"id": 1, "name": "de", "image_url": "quay.io/ansible/de:latest"}]
            }))
        }
        let base = serve(Router::new().route("/eda/decision-environments/", get(des))).await;
        let ctx = context(|c| c.eda = UpstreamConfig::new(format!("{base}/eda"), None));

        let result = invoke::<ListDecisionEnvironmentsTool>(&ctx, args(json!({}))).await;
        let value = structured(&result);
        assert_eq!(value["results"][0]["image_url"], "quay.io/ansible/de:latest");
    }
}
