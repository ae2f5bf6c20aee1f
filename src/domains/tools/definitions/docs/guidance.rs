//! Recommendation and search-guidance tools built on the sitemap search.

use std::collections::HashSet;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use super::catalog::{SearchDocumentationParams, search};
use super::sitemap::{pdf_url, product_version};
use crate::domains::tools::ToolError;
use crate::domains::tools::context::ToolContext;
use crate::domains::tools::definitions::ToolDefinition;
use crate::domains::tools::definitions::common::{
    default_limit, one_of, require_non_empty, validate_limit,
};

/// Upper bound on suggested web queries.
const MAX_WEB_QUERIES: usize = 5;

const PREFERRED_FORMATS: &[&str] = &["pdf", "html", "auto"];

/// Score given to web hits; sitemap hits score 1.0.
const WEB_RELEVANCE: f64 = 0.8;

const PRIMARY_SITES: &[(&str, &str)] = &[
    ("docs.redhat.com", "Official Red Hat product documentation"),
    ("access.redhat.com", "Red Hat customer portal and knowledge base"),
    ("docs.openshift.com", "OpenShift-specific documentation"),
    ("docs.ansible.com", "Ansible documentation and guides"),
    ("developers.redhat.com", "Developer resources and tutorials"),
];

const CORE_DOMAINS: &[&str] = &["redhat.com", "openshift.com", "ansible.com"];

const TECH_TERMS: &[&str] = &["container", "image", "deploy", "install", "registry"];
const TECH_SITES: &[(&str, &str)] = &[
    ("registry.redhat.com", "Container images and deployment resources"),
    ("quay.io", "Red Hat container registry content"),
    ("console.redhat.com", "Red Hat console and management guides"),
];

const COMMUNITY_TERMS: &[&str] = &["tutorial", "example", "guide", "blog", "community"];
const COMMUNITY_SITES: &[(&str, &str)] = &[
    ("opensource.com", "Open source articles and tutorials"),
    ("developers.redhat.com", "Developer tutorials and guides"),
];

const SEARCH_TIPS: &[&str] = &[
    "Use site:docs.redhat.com to restrict to official Red Hat documentation",
    "Add specific version numbers (4.18, 4.17) for current documentation",
    "Use quotes around exact phrases like \"updating clusters\"",
    "Combine product names with your topic for focused results",
    "Look for PDF URLs in search results for reliable content access",
];

const POST_SEARCH_ACTIONS: &[&str] = &[
    "Copy found URLs and use read_documentation to access content",
    "Prefer PDF URLs; read_documentation converts HTML guide URLs to their PDF form",
    "Cross-reference web search results with the sitemap results",
    "Prioritize URLs with version 4.x over legacy 3.x documentation",
];

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecommendContentParams {
    #[schemars(description = "Topic of interest, e.g. kubernetes, automation, containers")]
    pub topic: String,

    #[schemars(description = "developer, administrator or architect (default: developer)")]
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "developer".to_string()
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SmartFinderParams {
    #[schemars(description = "What to look for, e.g. 'OpenShift edge computing cluster updates'")]
    pub query: String,

    #[schemars(description = "pdf (default), html or auto")]
    #[serde(default = "default_preferred_format")]
    pub preferred_format: String,

    #[schemars(description = "Maximum number of results (default: 5)")]
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_preferred_format() -> String {
    "pdf".to_string()
}

fn default_max_results() -> usize {
    5
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EnhancedSearchParams {
    #[schemars(description = "Search terms")]
    pub query: String,

    #[schemars(description = "Filter by product key (optional)")]
    pub product: Option<String>,

    #[schemars(description = "Filter by version (optional)")]
    pub version: Option<String>,

    #[schemars(description = "Maximum number of combined results (default: 10)")]
    #[serde(default = "default_limit")]
    pub limit: usize,

    #[schemars(description = "Include the web search source (default: true)")]
    #[serde(default = "default_include_web")]
    pub include_web_search: bool,
}

fn default_include_web() -> bool {
    true
}

pub struct RecommendContentTool;

#[async_trait]
impl ToolDefinition for RecommendContentTool {
    const NAME: &'static str = "recommend_content";
    const DESCRIPTION: &'static str =
        "Recommend Red Hat documentation for a topic and user role.";
    type Params = RecommendContentParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        require_non_empty("topic", &params.topic)?;
        let site = ctx.config().docs.base_url.trim_end_matches('/').to_string();
        let recommendations = recommend(&site, &params.topic, &params.role);
        Ok(json!({
            "topic": params.topic,
            "role": params.role,
            "total_recommendations": recommendations.len(),
            "recommendations": recommendations,
        }))
    }
}

pub struct SearchWithWebGuidanceTool;

#[async_trait]
impl ToolDefinition for SearchWithWebGuidanceTool {
    const NAME: &'static str = "search_with_web_guidance";
    const DESCRIPTION: &'static str = "Search the documentation sitemaps and suggest site: \
         restricted web search queries for finding more.";
    type Params = SearchDocumentationParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        let direct = search(ctx, &params).await?;
        let mut queries = web_queries(&params.query, params.product.as_deref());
        queries.truncate(MAX_WEB_QUERIES);

        Ok(json!({
            "query": params.query,
            "filters": { "product": params.product, "version": params.version },
            "direct_results": direct,
            "web_search_guidance": {
                "recommended_queries": queries,
                "search_tips": SEARCH_TIPS,
                "post_search_actions": POST_SEARCH_ACTIONS,
            },
            "workflow": [
                "Run this search to get direct sitemap-based results",
                "Use the suggested web search queries to find additional content",
                "Combine results and use read_documentation to access specific guides",
            ],
        }))
    }
}

pub struct SearchDocumentationEnhancedTool;

#[async_trait]
impl ToolDefinition for SearchDocumentationEnhancedTool {
    const NAME: &'static str = "search_documentation_enhanced";
    const DESCRIPTION: &'static str = "Search the documentation sitemaps and a web search \
         source, merge the hits without duplicate URLs and rank them by relevance.";
    type Params = EnhancedSearchParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        let limit = validate_limit(params.limit);
        let search_params = SearchDocumentationParams {
            query: params.query.clone(),
            product: params.product.clone(),
            version: params.version.clone(),
            limit,
        };
        let sitemap = search(ctx, &search_params).await?;
        let web = if params.include_web_search {
            web_source(&params.query)
        } else {
            json!({ "total_found": 0, "results": [] })
        };

        let combined = merge_results(
            sitemap["results"].as_array().cloned().unwrap_or_default(),
            web["results"].as_array().map(Vec::as_slice).unwrap_or_default(),
            limit,
        );

        Ok(json!({
            "query": params.query,
            "filters": { "product": params.product, "version": params.version },
            "sources": { "sitemap": sitemap, "web_search": web },
            "total_found": combined.len(),
            "combined_results": combined,
        }))
    }
}

/// The web search source. No search backend is called from the server, so
/// it carries the `site:` query for the client to run and no hits.
fn web_source(query: &str) -> Value {
    json!({
        "query": format!("site:docs.redhat.com {query}"),
        "total_found": 0,
        "results": [],
        "note": "Web searches are not executed by this server; run the query with a web search tool.",
    })
}

/// Sitemap hits followed by web hits whose URL is new, ordered by
/// `relevance_score` (stable, highest first) and cut to `limit`.
///
/// Web hits are `{title, url, snippet, source}`; they are reshaped into the
/// sitemap result layout.
pub fn merge_results(sitemap: Vec<Value>, web: &[Value], limit: usize) -> Vec<Value> {
    let mut combined: Vec<Value> = sitemap
        .into_iter()
        .map(|mut hit| {
            if let Some(obj) = hit.as_object_mut() {
                obj.insert("source".to_string(), json!("sitemap"));
            }
            hit
        })
        .collect();

    let mut seen: HashSet<String> = combined
        .iter()
        .filter_map(|hit| hit.get("html_url").or_else(|| hit.get("url")))
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();

    for hit in web {
        let Some(url) = hit.get("url").and_then(Value::as_str) else {
            continue;
        };
        if !seen.insert(url.to_string()) {
            continue;
        }
        let mut entry = json!({
            "title": hit.get("title").cloned().unwrap_or(Value::Null),
            "html_url": url,
            "pdf_url": pdf_url(url),
            "snippet": hit.get("snippet").cloned().unwrap_or(Value::Null),
            "source": hit.get("source").cloned().unwrap_or_else(|| json!("web_search")),
            "relevance_score": WEB_RELEVANCE,
        });
        if let (Some((product, version)), Some(obj)) = (product_version(url), entry.as_object_mut())
        {
            obj.insert("product".to_string(), json!(product));
            obj.insert("version".to_string(), json!(version));
        }
        combined.push(entry);
    }

    let score = |hit: &Value| hit.get("relevance_score").and_then(Value::as_f64).unwrap_or(0.0);
    combined.sort_by(|a, b| score(b).total_cmp(&score(a)));
    combined.truncate(limit);
    combined
}

pub struct SmartDocumentationFinderTool;

#[async_trait]
impl ToolDefinition for SmartDocumentationFinderTool {
    const NAME: &'static str = "smart_documentation_finder";
    const DESCRIPTION: &'static str = "Find documentation for a query and return each result \
         with HTML and PDF access options and a recommended URL.";
    type Params = SmartFinderParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        one_of("preferred_format", &params.preferred_format, PREFERRED_FORMATS)?;
        let max_results = params.max_results.clamp(1, 50);

        let search_params = SearchDocumentationParams {
            query: params.query.clone(),
            product: None,
            version: None,
            limit: max_results * 2,
        };
        let direct = search(ctx, &search_params).await?;

        let results: Vec<Value> = direct["results"]
            .as_array()
            .into_iter()
            .flatten()
            .filter(|r| r["html_url"].as_str().is_some_and(|u| !u.is_empty()))
            .take(max_results)
            .map(|r| access_options(r, &params.preferred_format))
            .collect();

        Ok(json!({
            "query": params.query,
            "preferred_format": params.preferred_format,
            "total_found": results.len(),
            "results": results,
            "recommendations": finder_tips(&params.query),
            "usage_tips": [
                format!("Use PDF URLs for reliable content access (preferred format: {})", params.preferred_format),
                "HTML URLs may require JavaScript rendering",
                "Check multiple guides for comprehensive information",
                "Newer versions (4.x) are recommended over legacy (3.x) documentation",
            ],
        }))
    }
}

/// `site:` restricted queries for the official domains relevant to `query`.
pub fn web_queries(query: &str, product: Option<&str>) -> Vec<Value> {
    let lower = query.to_lowercase();
    let mut queries = Vec::new();

    for (site, what) in PRIMARY_SITES {
        queries.push(web_query(
            query,
            site,
            format!("Find content on {what}"),
            format!("Official {site} documentation and resources"),
        ));
    }
    for domain in CORE_DOMAINS {
        queries.push(web_query(
            query,
            domain,
            format!("Find any content across {domain} and subdomains"),
            format!("Comprehensive {domain} content including docs, blogs, and resources"),
        ));
    }
    if TECH_TERMS.iter().any(|t| lower.contains(t)) {
        for (site, what) in TECH_SITES {
            queries.push(web_query(
                query,
                site,
                format!("Find {what}"),
                format!("Technical resources from {site}"),
            ));
        }
    }
    for name in ["openshift", "ansible"] {
        if lower.contains(name) || product == Some(name) {
            let domain = format!("{name}.com");
            queries.push(json!({
                "query": format!("site:{domain} OR site:docs.{domain} {query}"),
                "domain": domain,
                "purpose": format!("Find comprehensive {} content", capitalize(name)),
                "expected_results": format!("Official {} documentation and resources", capitalize(name)),
            }));
        }
    }
    if COMMUNITY_TERMS.iter().any(|t| lower.contains(t)) {
        for (site, what) in COMMUNITY_SITES {
            queries.push(web_query(
                query,
                site,
                format!("Find {what}"),
                format!("Community content and tutorials from {site}"),
            ));
        }
    }
    queries
}

fn web_query(query: &str, domain: &str, purpose: String, expected: String) -> Value {
    json!({
        "query": format!("site:{domain} {query}"),
        "domain": domain,
        "purpose": purpose,
        "expected_results": expected,
    })
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Keyword → product recommendations. Falls back to a general entry.
pub fn recommend(site: &str, topic: &str, role: &str) -> Vec<Value> {
    let topic = topic.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| topic.contains(w));
    let ocp = format!("{site}/en/documentation/openshift_container_platform/4.18");
    let mut out = Vec::new();

    if has(&["container", "kubernetes", "k8s", "docker", "pod"]) {
        out.push(json!({
            "product": "OpenShift Container Platform",
            "relevance": "high",
            "reason": "OpenShift is Red Hat's enterprise Kubernetes platform for container orchestration",
            "guides": [
                "Getting Started with OpenShift",
                "Installing OpenShift on your cloud provider",
                if role == "developer" { "Developer Guide" } else { "Administration Guide" },
            ],
            "base_url": ocp,
        }));
    }
    if has(&["edge", "telco", "cnf", "5g", "network function"]) {
        out.push(json!({
            "product": "OpenShift Container Platform - Edge Computing",
            "relevance": "high",
            "reason": "OpenShift provides specialized edge computing capabilities for telco and CNF workloads",
            "guides": [
                "Edge Computing Guide",
                "Scalability and Performance",
                "Post-installation Configuration",
                if topic.contains("update") { "Updating Clusters" } else { "Administration Guide" },
            ],
            "base_url": ocp,
        }));
    }
    if has(&["upgrade", "update", "upgrading"]) {
        out.push(json!({
            "product": "OpenShift Container Platform - Cluster Updates",
            "relevance": "high",
            "reason": "Comprehensive guidance for updating OpenShift clusters safely",
            "guides": [
                "Updating Clusters",
                "Updating Machines in a Cluster",
                "Administration Guide",
                "Post-installation Configuration",
            ],
            "base_url": ocp,
        }));
    }
    if has(&["automation", "ansible", "playbook", "configuration"]) {
        out.push(json!({
            "product": "Red Hat Ansible Automation Platform",
            "relevance": "high",
            "reason": "Ansible Automation Platform provides enterprise automation capabilities",
            "guides": [
                "Getting Started with Ansible",
                "Automation Controller User Guide",
                "Best Practices Guide",
            ],
            "base_url": format!("{site}/en/documentation/red_hat_ansible_automation_platform/2.4"),
        }));
    }
    if has(&["linux", "rhel", "operating system", "os", "server"]) {
        out.push(json!({
            "product": "Red Hat Enterprise Linux",
            "relevance": "high",
            "reason": "RHEL is Red Hat's enterprise Linux distribution",
            "guides": [
                "Getting Started with RHEL",
                if matches!(role, "administrator" | "architect") { "System Administrator's Guide" } else { "User Guide" },
                "Security Guide",
            ],
            "base_url": format!("{site}/en/documentation/red_hat_enterprise_linux/9"),
        }));
    }
    if has(&["management", "satellite", "patch", "compliance"]) {
        out.push(json!({
            "product": "Red Hat Satellite",
            "relevance": "medium",
            "reason": "Satellite provides systems management and compliance capabilities",
            "guides": [
                "Installing Satellite",
                if role == "administrator" { "Managing Hosts" } else { "User Guide" },
                "Content Management Guide",
            ],
            "base_url": format!("{site}/en/documentation/red_hat_satellite/6.15"),
        }));
    }

    if out.is_empty() {
        out.push(json!({
            "product": "Red Hat Product Documentation",
            "relevance": "medium",
            "reason": format!("General Red Hat documentation for {role}s"),
            "guides": [
                "Browse all Red Hat products",
                "Getting started guides",
                "Best practices documentation",
            ],
            "base_url": site,
        }));
    }
    out
}

fn access_options(result: &Value, preferred: &str) -> Value {
    let html = result["html_url"].as_str().unwrap_or_default();
    let pdf = result["pdf_url"].as_str().unwrap_or_default();
    json!({
        "title": result["title"],
        "source": "sitemap",
        "product": result["product"],
        "version": result["version"],
        "relevance_score": result["relevance_score"],
        "access_options": {
            "html": {
                "url": html,
                "format": "html",
                "notes": "May require JavaScript rendering; read_documentation returns its text",
            },
            "pdf": {
                "url": pdf,
                "format": "pdf",
                "notes": "Direct PDF access, best for content extraction",
            },
        },
        "recommended_url": if preferred == "pdf" { pdf } else { html },
        "recommended_format": preferred,
    })
}

fn finder_tips(query: &str) -> Vec<&'static str> {
    let lower = query.to_lowercase();
    let mut tips = Vec::new();
    if ["upgrade", "update"].iter().any(|w| lower.contains(w)) {
        tips.push("For cluster upgrades, prioritize the 'Updating Clusters' guide");
    }
    if ["edge", "telco", "cnf"].iter().any(|w| lower.contains(w)) {
        tips.push("For edge deployments, also check 'Edge Computing' and 'Scalability and Performance' guides");
    }
    if lower.contains("install") {
        tips.push("Check both installation guides and post-installation configuration");
    }
    tips
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::docs::mock::{docs_context, site};
    use crate::domains::tools::definitions::invoke;
    use crate::domains::tools::definitions::testing::{args, error_text, structured};

    #[test]
    fn test_web_queries() {
        let queries = web_queries("install openshift container", None);
        // Five primary sites, three core domains, three registry sites, one
        // product-specific query.
        assert_eq!(queries.len(), 12);
        assert_eq!(queries[0]["query"], "site:docs.redhat.com install openshift container");
        assert_eq!(queries[5]["domain"], "redhat.com");
        assert_eq!(queries[8]["domain"], "registry.redhat.com");
        assert_eq!(
            queries[11]["query"],
            "site:openshift.com OR site:docs.openshift.com install openshift container"
        );

        let queries = web_queries("ansible tutorial", None);
        assert_eq!(queries.len(), 11);
        assert_eq!(queries.last().unwrap()["domain"], "developers.redhat.com");

        assert_eq!(web_queries("x", Some("ansible")).len(), 9);
    }

    #[test]
    fn test_recommend() {
        let recs = recommend("https://docs.redhat.com", "Kubernetes automation", "administrator");
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0]["product"], "OpenShift Container Platform");
        assert_eq!(recs[0]["guides"][2], "Administration Guide");
        assert_eq!(recs[1]["product"], "Red Hat Ansible Automation Platform");

        let recs = recommend("https://docs.redhat.com", "patch compliance", "administrator");
        assert_eq!(recs[0]["relevance"], "medium");
        assert_eq!(recs[0]["guides"][1], "Managing Hosts");

        let recs = recommend("https://docs.redhat.com", "quantum", "architect");
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0]["reason"], "General Red Hat documentation for architects");
        assert_eq!(recs[0]["base_url"], "https://docs.redhat.com");
    }

    #[test]
    fn test_merge_results_dedupes_and_ranks() {
        let sitemap = vec![
            json!({"title": "A", "html_url": "https://docs.redhat.com/a", "relevance_score": 1.0}),
            json!({"title": "B", "html_url": "https://docs.redhat.com/b", "relevance_score": 0.5}),
        ];
        let web = [
            json!({"title": "A again", "url": "https://docs.redhat.com/a", "snippet": "dup"}),
            json!({
                "title": "Updating",
                "url": "https://docs.redhat.com/en/documentation/openshift_container_platform/4.18/html/updating_clusters/index",
                "snippet": "How to update",
                "source": "web_search",
            }),
            json!({"title": "no url"}),
        ];

        let merged = merge_results(sitemap, &web, 10);
        let titles: Vec<&str> = merged.iter().map(|h| h["title"].as_str().unwrap()).collect();
        assert_eq!(titles, ["A", "Updating", "B"]);
        assert_eq!(merged[0]["source"], "sitemap");
        assert_eq!(merged[1]["relevance_score"], 0.8);
        assert_eq!(merged[1]["product"], "openshift_container_platform");
        assert_eq!(merged[1]["version"], "4.18");
        assert_eq!(
            merged[1]["pdf_url"],
            "https://docs.redhat.com/en/documentation/openshift_container_platform/4.18/pdf/updating_clusters/index"
        );

        assert_eq!(merge_results(Vec::new(), &web, 1).len(), 1);
    }

    #[tokio::test]
    async fn test_search_documentation_enhanced() {
        let base = site().await;
        let ctx = docs_context(&base);

        let result = invoke::<SearchDocumentationEnhancedTool>(
            &ctx,
            args(json!({"query": "openshift", "limit": 3})),
        )
        .await;
        let value = structured(&result);
        assert_eq!(value["total_found"], 3);
        let combined = value["combined_results"].as_array().unwrap();
        assert!(combined.iter().all(|h| h["source"] == "sitemap"));
        assert_eq!(value["sources"]["web_search"]["query"], "site:docs.redhat.com openshift");
        assert_eq!(value["sources"]["sitemap"]["total_found"], 3);

        let result = invoke::<SearchDocumentationEnhancedTool>(
            &ctx,
            args(json!({"query": "openshift", "include_web_search": false})),
        )
        .await;
        let value = structured(&result);
        assert!(value["sources"]["web_search"].get("query").is_none());
    }

    #[test]
    fn test_finder_tips() {
        assert_eq!(finder_tips("edge cluster update").len(), 2);
        assert!(finder_tips("networking").is_empty());
    }

    #[tokio::test]
    async fn test_search_with_web_guidance() {
        let base = site().await;
        let ctx = docs_context(&base);

        let result = invoke::<SearchWithWebGuidanceTool>(
            &ctx,
            args(json!({"query": "openshift upgrade", "limit": 5})),
        )
        .await;
        let value = structured(&result);
        assert_eq!(value["direct_results"]["total_found"], 5);
        assert_eq!(
            value["direct_results"]["results"][0]["guide"],
            "updating_clusters"
        );
        let queries = value["web_search_guidance"]["recommended_queries"].as_array().unwrap();
        assert_eq!(queries.len(), MAX_WEB_QUERIES);
        assert_eq!(value["web_search_guidance"]["search_tips"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_smart_finder_recommends_preferred_format() {
        let base = site().await;
        let ctx = docs_context(&base);

        let result = invoke::<SmartDocumentationFinderTool>(
            &ctx,
            args(json!({"query": "openshift install", "max_results": 2})),
        )
        .await;
        let value = structured(&result);
        assert_eq!(value["total_found"], 2);
        let first = &value["results"][0];
        assert_eq!(first["recommended_format"], "pdf");
        assert_eq!(first["recommended_url"], first["access_options"]["pdf"]["url"]);
        assert!(first["recommended_url"].as_str().unwrap().contains("/pdf/"));
        assert_eq!(value["recommendations"].as_array().unwrap().len(), 1);

        let result = invoke::<SmartDocumentationFinderTool>(
            &ctx,
            args(json!({"query": "openshift", "preferred_format": "epub"})),
        )
        .await;
        assert!(error_text(&result).contains("preferred_format"));
    }

    #[tokio::test]
    async fn test_recommend_content_tool() {
        let ctx = docs_context("https://docs.example.redhat.com");
        let result = invoke::<RecommendContentTool>(&ctx, args(json!({"topic": "RHEL server hardening"}))).await;
        let value = structured(&result);
        assert_eq!(value["role"], "developer");
        assert_eq!(value["recommendations"][0]["guides"][1], "User Guide");
        assert_eq!(
            value["recommendations"][0]["base_url"],
            "https://docs.example.redhat.com/en/documentation/red_hat_enterprise_linux/9"
        );
    }
}
