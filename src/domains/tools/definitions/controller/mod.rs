//! Automation controller toolset.
//!
//! Inventories, hosts, job templates, jobs and projects on the controller
//! REST API (`AAP_URL`, e.g. `https://aap.example.com/api/controller/v2`).

mod hosts;
mod inventories;
mod jobs;
mod projects;

use serde_json::Value;

pub use hosts::{CreateHostTool, ListHostsTool};
pub use inventories::{
    CreateInventoryTool, DeleteInventoryTool, GetInventoryTool, ListInventoriesTool,
    UpdateInventoryTool,
};
pub use jobs::{
    CancelJobTool, JobLogsTool, JobStatusTool, ListJobTemplatesTool, ListRecentJobsTool,
    RunJobTool,
};
pub use projects::{ListProjectsTool, SyncProjectTool};

toolset!(
    ListInventoriesTool,
    GetInventoryTool,
    CreateInventoryTool,
    UpdateInventoryTool,
    DeleteInventoryTool,
    ListHostsTool,
    CreateHostTool,
    ListJobTemplatesTool,
    RunJobTool,
    JobStatusTool,
    JobLogsTool,
    CancelJobTool,
    ListRecentJobsTool,
    ListProjectsTool,
    SyncProjectTool,
);

/// The controller stores variables as a YAML/JSON string. Strings pass
/// through; anything else is serialized as JSON.
fn variables_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `page_size` plus optional `search` query pairs.
fn list_query(page_size: usize, search: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = vec![("page_size", page_size.to_string())];
    if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
        query.push(("search", search.to_string()));
    }
    query
}
