//! Ansible Galaxy toolset.
//!
//! Collection and role discovery against the Galaxy API (`GALAXY_URL`,
//! default `https://galaxy.ansible.com`). Search results are filtered
//! client-side: Galaxy's keyword search is broad, so entries are kept only
//! when the query appears in their name, namespace, description or tags.

use std::cmp::Ordering;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::domains::tools::ToolError;
use crate::domains::tools::context::ToolContext;
use crate::domains::tools::definitions::ToolDefinition;
use crate::domains::tools::definitions::common::{default_limit, require_non_empty, validate_limit};

const COLLECTION_SEARCH_PATH: &str = "api/v3/plugin/ansible/search/collection-versions/";
const COLLECTION_INDEX_PATH: &str = "api/v3/plugin/ansible/content/published/collections/index";
const ROLE_SEARCH_PATH: &str = "api/v1/roles/";

/// Upstream page size used before client-side filtering.
const FETCH_SIZE: &str = "100";

toolset!(
    SearchCollectionsTool,
    GetCollectionTool,
    ListCollectionVersionsTool,
    SearchRolesTool,
    InstallCommandTool,
);

// ============================================================================
// Tool Parameters
// ============================================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchCollectionsParams {
    #[schemars(description = "Search text matched against name, namespace, description and tags")]
    pub query: String,

    #[schemars(description = "Only collections of this namespace")]
    #[serde(default)]
    pub namespace: Option<String>,

    #[schemars(description = "Maximum number of results (1-100, default: 10)")]
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CollectionParams {
    #[schemars(description = "Collection namespace, e.g. 'community'")]
    pub namespace: String,

    #[schemars(description = "Collection name, e.g. 'general'")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CollectionVersionsParams {
    #[schemars(description = "Collection namespace")]
    pub namespace: String,

    #[schemars(description = "Collection name")]
    pub name: String,

    #[schemars(description = "Maximum number of versions, newest first (1-100, default: 20)")]
    #[serde(default = "default_versions_limit")]
    pub limit: usize,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchRolesParams {
    #[schemars(description = "Keyword matched against role name, namespace, description and tags")]
    pub keyword: String,

    #[schemars(description = "Maximum number of results (1-100, default: 10)")]
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct InstallCommandParams {
    #[schemars(description = "Collection namespace")]
    pub namespace: String,

    #[schemars(description = "Collection name")]
    pub name: String,

    #[schemars(description = "Exact version to pin (optional)")]
    #[serde(default)]
    pub version: Option<String>,
}

fn default_versions_limit() -> usize {
    20
}

// ============================================================================
// Tools
// ============================================================================

pub struct SearchCollectionsTool;

#[async_trait]
impl ToolDefinition for SearchCollectionsTool {
    const NAME: &'static str = "search_collections";
    const DESCRIPTION: &'static str =
        "Search Ansible Galaxy collections by keyword, optionally within one namespace.";
    type Params = SearchCollectionsParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        require_non_empty("query", &params.query)?;
        let limit = validate_limit(params.limit);
        let needle = params.query.to_lowercase();

        let query = [
            ("keywords", params.query.as_str()),
            ("is_highest", "true"),
            ("is_deprecated", "false"),
            ("limit", FETCH_SIZE),
        ];
        let response = ctx
            .galaxy()?
            .get(COLLECTION_SEARCH_PATH, Some(&query))
            .await?;

        let results: Vec<Value> = data_array(&response)
            .iter()
            .map(collection_summary)
            .filter(|c| {
                params
                    .namespace
                    .as_deref()
                    .is_none_or(|ns| c["namespace"].as_str().is_some_and(|v| v.eq_ignore_ascii_case(ns)))
            })
            .filter(|c| collection_matches(c, &needle))
            .take(limit)
            .collect();

        Ok(json!({
            "query": params.query,
            "count": results.len(),
            "results": results,
        }))
    }
}

pub struct GetCollectionTool;

#[async_trait]
impl ToolDefinition for GetCollectionTool {
    const NAME: &'static str = "get_collection";
    const DESCRIPTION: &'static str = "Get details of one Galaxy collection.";
    type Params = CollectionParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        check_content_name("namespace", &params.namespace)?;
        check_content_name("name", &params.name)?;

        let path = format!(
            "{COLLECTION_INDEX_PATH}/{}/{}/",
            params.namespace, params.name
        );
        let record = ctx.galaxy()?.get::<()>(&path, None).await?;

        let highest_version = record
            .get("highest_version")
            .and_then(|h| h.get("version"))
            .cloned()
            .unwrap_or(Value::Null);
        let field = |name: &str| record.get(name).cloned().unwrap_or(Value::Null);

        Ok(json!({
            "namespace": field("namespace"),
            "name": field("name"),
            "highest_version": highest_version,
            "download_count": field("download_count"),
            "deprecated": field("deprecated"),
            "created_at": field("created_at"),
            "updated_at": field("updated_at"),
        }))
    }
}

pub struct ListCollectionVersionsTool;

#[async_trait]
impl ToolDefinition for ListCollectionVersionsTool {
    const NAME: &'static str = "list_collection_versions";
    const DESCRIPTION: &'static str = "List versions of a Galaxy collection, newest first.";
    type Params = CollectionVersionsParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        check_content_name("namespace", &params.namespace)?;
        check_content_name("name", &params.name)?;
        let limit = validate_limit(params.limit);

        let path = format!(
            "{COLLECTION_INDEX_PATH}/{}/{}/versions/",
            params.namespace, params.name
        );
        let response = ctx
            .galaxy()?
            .get(&path, Some(&[("limit", FETCH_SIZE)]))
            .await?;

        let mut versions: Vec<Value> = data_array(&response)
            .iter()
            .map(|v| {
                json!({
                    "version": v.get("version").cloned().unwrap_or(Value::Null),
                    "created_at": v.get("created_at").cloned().unwrap_or(Value::Null),
                    "requires_ansible": v.get("requires_ansible").cloned().unwrap_or(Value::Null),
                })
            })
            .collect();
        versions.sort_by(|a, b| {
            compare_versions(
                b["version"].as_str().unwrap_or_default(),
                a["version"].as_str().unwrap_or_default(),
            )
        });

        let total = versions.len();
        versions.truncate(limit);
        Ok(json!({
            "namespace": params.namespace,
            "name": params.name,
            "total_versions": total,
            "versions": versions,
        }))
    }
}

pub struct SearchRolesTool;

#[async_trait]
impl ToolDefinition for SearchRolesTool {
    const NAME: &'static str = "search_roles";
    const DESCRIPTION: &'static str = "Search standalone Ansible Galaxy roles by keyword.";
    type Params = SearchRolesParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        require_non_empty("keyword", &params.keyword)?;
        let limit = validate_limit(params.limit);
        let needle = params.keyword.to_lowercase();

        let query = [("keywords", params.keyword.as_str()), ("page_size", FETCH_SIZE)];
        let response = ctx.galaxy()?.get(ROLE_SEARCH_PATH, Some(&query)).await?;

        let results: Vec<Value> = response
            .get("results")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(role_summary)
            .filter(|r| collection_matches(r, &needle))
            .take(limit)
            .collect();

        Ok(json!({
            "keyword": params.keyword,
            "count": results.len(),
            "results": results,
        }))
    }
}

pub struct InstallCommandTool;

#[async_trait]
impl ToolDefinition for InstallCommandTool {
    const NAME: &'static str = "install_command";
    const DESCRIPTION: &'static str =
        "Build the ansible-galaxy install command and requirements.yml entry for a collection.";
    type Params = InstallCommandParams;

    async fn run(_ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        check_content_name("namespace", &params.namespace)?;
        check_content_name("name", &params.name)?;

        let fqcn = format!("{}.{}", params.namespace, params.name);
        let version = params.version.filter(|v| !v.trim().is_empty());

        let (command, requirements) = match &version {
            Some(v) => (
                format!("ansible-galaxy collection install {fqcn}:=={v}"),
                format!("collections:\n  - name: {fqcn}\n    version: \"{v}\"\n"),
            ),
            None => (
                format!("ansible-galaxy collection install {fqcn}"),
                format!("collections:\n  - name: {fqcn}\n"),
            ),
        };

        Ok(json!({
            "collection": fqcn,
            "version": version,
            "command": command,
            "requirements_yml": requirements,
            "install_from_requirements": "ansible-galaxy collection install -r requirements.yml",
        }))
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Galaxy namespaces and collection names are `[a-z0-9_]+`. Anything else
/// would change the request path.
fn check_content_name(field: &str, value: &str) -> Result<(), ToolError> {
    let valid = !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
    if valid {
        return Ok(());
    }
    Err(ToolError::invalid_arguments(format!(
        "'{field}' must contain only lowercase letters, digits and underscores, got '{value}'"
    )))
}

/// `data` (v3) or `results` (v1) of a Galaxy response.
fn data_array(response: &Value) -> &[Value] {
    response
        .get("data")
        .or_else(|| response.get("results"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Flatten a search entry; the interesting fields live under
/// `collection_version`.
fn collection_summary(entry: &Value) -> Value {
    let cv = entry.get("collection_version").unwrap_or(entry);
    let field = |name: &str| cv.get(name).cloned().unwrap_or(Value::Null);
    json!({
        "namespace": field("namespace"),
        "name": field("name"),
        "version": field("version"),
        "description": field("description"),
        "tags": tag_names(cv.get("tags")),
        "deprecated": entry.get("is_deprecated").cloned().unwrap_or(Value::Bool(false)),
    })
}

fn role_summary(role: &Value) -> Value {
    let summary = role.get("summary_fields");
    let namespace = summary
        .and_then(|s| s.get("namespace"))
        .and_then(|n| n.get("name"))
        .or_else(|| role.get("github_user"))
        .cloned()
        .unwrap_or(Value::Null);
    let tags = summary
        .and_then(|s| s.get("tags"))
        .or_else(|| role.get("tags"));
    let field = |name: &str| role.get(name).cloned().unwrap_or(Value::Null);
    json!({
        "id": field("id"),
        "namespace": namespace,
        "name": field("name"),
        "description": field("description"),
        "download_count": field("download_count"),
        "tags": tag_names(tags),
    })
}

/// Tags arrive as plain strings or as `{name}` objects.
fn tag_names(tags: Option<&Value>) -> Vec<String> {
    tags.and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|t| t.as_str().or_else(|| t.get("name").and_then(Value::as_str)))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Case-insensitive substring match on namespace, name and description, or
/// on any tag.
fn collection_matches(summary: &Value, needle: &str) -> bool {
    let text_match = ["namespace", "name", "description"].iter().any(|key| {
        summary[*key]
            .as_str()
            .is_some_and(|v| v.to_lowercase().contains(needle))
    });
    let tag_match = summary["tags"].as_array().is_some_and(|tags| {
        tags.iter()
            .filter_map(Value::as_str)
            .any(|t| t.to_lowercase().contains(needle))
    });
    text_match || tag_match
}

/// Order versions by numeric dot components; versions with a non-numeric
/// component sort below all numeric ones and among themselves by text.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (numeric_parts(a), numeric_parts(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.cmp(b),
    }
}

fn numeric_parts(version: &str) -> Option<Vec<u64>> {
    version
        .split('.')
        .map(|part| part.parse::<u64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::UpstreamConfig;
    use crate::domains::tools::definitions::invoke;
    use crate::domains::tools::definitions::testing::{
        args, context, error_text, serve, structured,
    };
    use axum::{
        Json, Router,
        extract::Query,
        http::{HeaderMap, StatusCode},
        routing::get,
    };
    use std::collections::HashMap;

    async fn galaxy(app: Router) -> ToolContext {
        let base = serve(app).await;
        context(|c| c.galaxy = UpstreamConfig::new(base, None))
    }

    fn search_fixture() -> Value {
        json!({
            "meta": {"count": 3},
            "data": [
                {"is_deprecated": false, "collection_version": {
                    "namespace": "community", "name": "docker", "version": "3.10.0",
                    "description": "Manage containers", "tags": [{"name": "docker"}]}},
                {"is_deprecated": false, "collection_version": {
                    "namespace": "containers", "name": "podman", "version": "1.15.0",
                    "description": "Podman modules", "tags": [{"name": "container"}]}},
                {"is_deprecated": false, "collection_version": {
                    "namespace": "ansible", "name": "posix", "version": "1.5.4",
                    "description": "POSIX modules", "tags": []}}
            ]
        })
    }

    #[tokio::test]
    async fn test_search_filters_client_side() {
        async fn search(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
            assert_eq!(q.get("is_highest").map(String::as_str), Some("true"));
            Json(search_fixture())
        }
        let ctx = galaxy(Router::new().route(&format!("/{COLLECTION_SEARCH_PATH}"), get(search))).await;

        let result = invoke::<SearchCollectionsTool>(&ctx, args(json!({"query": "CONTAINER"}))).await;
        let value = structured(&result);
        let names: Vec<&str> = value["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["docker", "podman"]);

        let result = invoke::<SearchCollectionsTool>(
            &ctx,
            args(json!({"query": "container", "namespace": "containers"})),
        )
        .await;
        assert_eq!(structured(&result)["count"], 1);

        let result = invoke::<SearchCollectionsTool>(
            &ctx,
            args(json!({"query": "modules", "limit": 1})),
        )
        .await;
        assert_eq!(structured(&result)["count"], 1);
    }

    #[tokio::test]
    async fn test_get_collection_sends_token_and_flattens() {
        async fn detail(headers: HeaderMap) -> (StatusCode, Json<Value>) {
            if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Token abc") {
                return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "no token"})));
            }
            (
                StatusCode::OK,
                Json(json!({
                    "namespace": "community", "name": "general",
                    "highest_version": {"href": "/x", "version": "9.2.0"},
                    "download_count": 100, "deprecated": false,
                    "created_at": "2020-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z"
                })),
            )
        }
        let base = serve(Router::new().route(
            &format!("/{COLLECTION_INDEX_PATH}/community/general/"),
            get(detail),
        ))
        .await;
        let ctx = context(|c| c.galaxy = UpstreamConfig::new(base, Some("abc".into())));

        let result = invoke::<GetCollectionTool>(
            &ctx,
            args(json!({"namespace": "community", "name": "general"})),
        )
        .await;
        let value = structured(&result);
        assert_eq!(value["highest_version"], "9.2.0");
        assert_eq!(value["download_count"], 100);
    }

    #[tokio::test]
    async fn test_get_collection_not_found() {
        async fn missing() -> (StatusCode, &'static str) {
            (StatusCode::NOT_FOUND, "{\"errors\":[{\"status\":\"404\"}]}")
        }
        let ctx = galaxy(Router::new().route(
            &format!("/{COLLECTION_INDEX_PATH}/nope/nothing/"),
            get(missing),
        ))
        .await;

        let result = invoke::<GetCollectionTool>(
            &ctx,
            args(json!({"namespace": "nope", "name": "nothing"})),
        )
        .await;
        assert!(error_text(&result).contains("404"));
    }

    #[tokio::test]
    async fn test_versions_sorted_newest_first() {
        async fn versions() -> Json<Value> {
            Json(json!({
                "meta": {"count": 4},
                "data": [
                    {"version": "1.9.0"}, {"version": "1.10.0"},
                    {"version": "2.0.0-beta"}, {"version": "1.2.3"}
                ]
            }))
        }
        let ctx = galaxy(Router::new().route(
            &format!("/{COLLECTION_INDEX_PATH}/ns/col/versions/"),
            get(versions),
        ))
        .await;

        let result = invoke::<ListCollectionVersionsTool>(
            &ctx,
            args(json!({"namespace": "ns", "name": "col", "limit": 3})),
        )
        .await;
        let value = structured(&result);
        let order: Vec<&str> = value["versions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["version"].as_str().unwrap())
            .collect();
        assert_eq!(order, vec!["1.10.0", "1.9.0", "1.2.3"]);
        assert_eq!(value["total_versions"], 4);
    }

    #[tokio::test]
    async fn test_search_roles_matches_tags() {
        async fn roles() -> Json<Value> {
            Json(json!({
                "count": 2,
                "results": [
                    {"id": 1, "name": "nginx", "description": "web server",
                     "summary_fields": {"namespace": {"name": "geerlingguy"}, "tags": ["web", "proxy"]}},
                    {"id": 2, "name": "mysql", "description": "database",
                     "summary_fields": {"namespace": {"name": "geerlingguy"}, "tags": ["db"]}}
                ]
            }))
        }
        let ctx = galaxy(Router::new().route(&format!("/{ROLE_SEARCH_PATH}"), get(roles))).await;

        let result = invoke::<SearchRolesTool>(&ctx, args(json!({"keyword": "proxy"}))).await;
        let value = structured(&result);
        assert_eq!(value["count"], 1);
        assert_eq!(value["results"][0]["namespace"], "geerlingguy");
    }

    #[tokio::test]
    async fn test_install_command() {
        let ctx = context(|_| {});
        let result = invoke::<InstallCommandTool>(
            &ctx,
            args(json!({"namespace": "community", "name": "general", "version": "9.2.0"})),
        )
        .await;
        let value = structured(&result);
        assert_eq!(
            value["command"],
            "ansible-galaxy collection install community.general:==9.2.0"
        );
        assert!(value["requirements_yml"].as_str().unwrap().contains("version: \"9.2.0\""));
    }

    #[test]
    fn test_check_content_name() {
        assert!(check_content_name("name", "community_general2").is_ok());
        for bad in ["", "gen?eral", "gen#x", "..", "a/b", "General"] {
            assert!(check_content_name("name", bad).is_err(), "accepted {bad:?}");
        }
    }

    #[tokio::test]
    async fn test_path_breaking_names_never_reach_galaxy() {
        async fn any() -> StatusCode {
            panic!("request should have been rejected locally");
        }
        let ctx = galaxy(Router::new().fallback(any)).await;

        let result = invoke::<GetCollectionTool>(
            &ctx,
            args(json!({"namespace": "community", "name": "general?x=1"})),
        )
        .await;
        assert!(error_text(&result).contains("'name' must contain only"));

        let result = invoke::<ListCollectionVersionsTool>(
            &ctx,
            args(json!({"namespace": "..", "name": "general"})),
        )
        .await;
        assert!(error_text(&result).contains("'namespace' must contain only"));
    }

    #[test]
    fn test_compare_versions() {
        assert_eq!(compare_versions("1.10.0", "1.9.9"), Ordering::Greater);
        assert_eq!(compare_versions("2.0", "2.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.0.0-rc1", "0.1.0"), Ordering::Less);
    }
}
