//! Job templates and jobs.
//!
//! `run_job` only triggers a launch and returns the new job's identifier;
//! callers follow up with `job_status` and `job_logs`.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::list_query;
use crate::domains::tools::ToolError;
use crate::domains::tools::context::ToolContext;
use crate::domains::tools::definitions::ToolDefinition;
use crate::domains::tools::definitions::common::{
    default_limit, default_page_size, pick_page, validate_limit,
};

const TEMPLATE_FIELDS: &[&str] = &[
    "id",
    "name",
    "description",
    "playbook",
    "project",
    "inventory",
    "last_job_run",
    "status",
];

const JOB_SUMMARY_FIELDS: &[&str] = &[
    "id",
    "name",
    "status",
    "failed",
    "started",
    "finished",
    "elapsed",
    "job_template",
];

// ============================================================================
// Tool Parameters
// ============================================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListJobTemplatesParams {
    #[schemars(description = "Maximum number of templates to return (1-100, default: 25)")]
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[schemars(description = "Optional search string")]
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RunJobParams {
    #[schemars(description = "Job template ID to launch")]
    pub template_id: u64,

    #[schemars(description = "Extra variables passed to the playbook")]
    #[serde(default)]
    pub extra_vars: Option<Map<String, Value>>,

    #[schemars(description = "Host pattern limiting the run")]
    #[serde(default)]
    pub limit: Option<String>,

    #[schemars(description = "Inventory ID overriding the template's inventory")]
    #[serde(default)]
    pub inventory_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct JobIdParams {
    #[schemars(description = "Job ID")]
    pub job_id: u64,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct JobLogsParams {
    #[schemars(description = "Job ID")]
    pub job_id: u64,

    #[schemars(description = "Maximum characters of output to return, keeping the end (default: 20000)")]
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListRecentJobsParams {
    #[schemars(description = "Number of jobs to return (1-100, default: 10)")]
    #[serde(default = "default_limit")]
    pub limit: usize,

    #[schemars(description = "Only jobs with this status (e.g. failed, successful, running)")]
    #[serde(default)]
    pub status: Option<String>,
}

fn default_max_chars() -> usize {
    20_000
}

// ============================================================================
// Tools
// ============================================================================

pub struct ListJobTemplatesTool;

#[async_trait]
impl ToolDefinition for ListJobTemplatesTool {
    const NAME: &'static str = "list_job_templates";
    const DESCRIPTION: &'static str = "List job templates on the automation controller.";
    type Params = ListJobTemplatesParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        let page_size = validate_limit(params.page_size);
        let query = list_query(page_size, params.search.as_deref());
        let page = ctx
            .controller()?
            .get_page("job_templates/", Some(&query), page_size)
            .await?;
        Ok(pick_page(page, TEMPLATE_FIELDS))
    }
}

pub struct RunJobTool;

#[async_trait]
impl ToolDefinition for RunJobTool {
    const NAME: &'static str = "run_job";
    const DESCRIPTION: &'static str = "Launch a job template. Returns the new job ID; \
         use job_status and job_logs to follow it.";
    type Params = RunJobParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        let mut body = Map::new();
        if let Some(extra_vars) = params.extra_vars {
            body.insert("extra_vars".into(), Value::Object(extra_vars));
        }
        if let Some(limit) = params.limit.filter(|l| !l.trim().is_empty()) {
            body.insert("limit".into(), Value::String(limit));
        }
        if let Some(inventory) = params.inventory_id {
            body.insert("inventory".into(), json!(inventory));
        }

        let launched = ctx
            .controller()?
            .post(
                &format!("job_templates/{}/launch/", params.template_id),
                Some(&body),
            )
            .await?;

        let job_id = launched
            .get("job")
            .filter(|v| !v.is_null())
            .or_else(|| launched.get("id"))
            .cloned()
            .ok_or_else(|| ToolError::decode("launch response carries no job id"))?;

        Ok(json!({
            "job_id": job_id,
            "status": launched.get("status").cloned().unwrap_or_else(|| json!("pending")),
            "template_id": params.template_id,
            "url": launched.get("url").cloned().unwrap_or(Value::Null),
        }))
    }
}

pub struct JobStatusTool;

#[async_trait]
impl ToolDefinition for JobStatusTool {
    const NAME: &'static str = "job_status";
    const DESCRIPTION: &'static str = "Get the status of a job.";
    type Params = JobIdParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        let job = ctx
            .controller()?
            .get::<()>(&format!("jobs/{}/", params.job_id), None)
            .await?;
        let field = |name: &str| job.get(name).cloned().unwrap_or(Value::Null);

        Ok(json!({
            "job_id": params.job_id,
            "name": field("name"),
            "status": field("status"),
            "failed": field("failed"),
            "started": field("started"),
            "finished": field("finished"),
            "elapsed": field("elapsed"),
        }))
    }
}

pub struct JobLogsTool;

#[async_trait]
impl ToolDefinition for JobLogsTool {
    const NAME: &'static str = "job_logs";
    const DESCRIPTION: &'static str = "Get the text output of a job.";
    type Params = JobLogsParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        // Raw body: output that happens to parse as JSON must stay verbatim.
        let stdout = ctx
            .controller()?
            .fetch(&format!("jobs/{}/stdout/?format=txt", params.job_id))
            .await?
            .error_for_status()?
            .text();

        let (stdout, truncated) = tail_chars(&stdout, params.max_chars);
        Ok(json!({
            "job_id": params.job_id,
            "stdout": stdout,
            "truncated": truncated,
        }))
    }
}

pub struct CancelJobTool;

#[async_trait]
impl ToolDefinition for CancelJobTool {
    const NAME: &'static str = "cancel_job";
    const DESCRIPTION: &'static str = "Request cancellation of a running job.";
    type Params = JobIdParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        ctx.controller()?
            .post::<Value>(&format!("jobs/{}/cancel/", params.job_id), None)
            .await?;
        Ok(json!({ "job_id": params.job_id, "cancel_requested": true }))
    }
}

pub struct ListRecentJobsTool;

#[async_trait]
impl ToolDefinition for ListRecentJobsTool {
    const NAME: &'static str = "list_recent_jobs";
    const DESCRIPTION: &'static str =
        "List the most recently created jobs, optionally filtered by status.";
    type Params = ListRecentJobsParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        let limit = validate_limit(params.limit);
        let mut query = vec![
            ("order_by", "-created".to_string()),
            ("page_size", limit.to_string()),
        ];
        if let Some(status) = params.status.filter(|s| !s.trim().is_empty()) {
            query.push(("status", status));
        }
        let page = ctx
            .controller()?
            .get_page("jobs/", Some(&query), limit)
            .await?;
        Ok(pick_page(page, JOB_SUMMARY_FIELDS))
    }
}

/// Keep the last `max` characters.
fn tail_chars(text: &str, max: usize) -> (String, bool) {
    let total = text.chars().count();
    if total <= max {
        return (text.to_string(), false);
    }
    let skip = total - max;
    match text.char_indices().nth(skip) {
        Some((idx, _)) => (text[idx..].to_string(), true),
        None => (String::new(), true),
    }
}
