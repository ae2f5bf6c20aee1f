//! Product listing, search and guide lookup over the sitemap index.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::sitemap::{ProductIndex, fetch_products, major_minor, newest_first, site_root, title_case};
use crate::domains::tools::ToolError;
use crate::domains::tools::context::ToolContext;
use crate::domains::tools::definitions::ToolDefinition;
use crate::domains::tools::definitions::common::{default_limit, require_non_empty, validate_limit};

/// Products described by name rather than by their sitemap key.
const WELL_KNOWN_PRODUCTS: &[(&str, &str, &str)] = &[
    (
        "openshift_container_platform",
        "OpenShift Container Platform",
        "Enterprise Kubernetes platform",
    ),
    (
        "red_hat_enterprise_linux",
        "Red Hat Enterprise Linux (RHEL)",
        "Enterprise Linux operating system",
    ),
    (
        "red_hat_ansible_automation_platform",
        "Red Hat Ansible Automation Platform",
        "Enterprise automation platform",
    ),
    (
        "red_hat_satellite",
        "Red Hat Satellite",
        "Systems management platform",
    ),
];

/// Guides every product is expected to publish, in search order.
const COMMON_GUIDES: &[&str] = &[
    "installation_overview",
    "getting_started",
    "administration_guide",
    "user_guide",
    "release_notes",
];

/// OpenShift guides ranked first when the query is about upgrading.
const OPENSHIFT_UPGRADE_GUIDES: &[&str] = &[
    "updating_clusters",
    "upgrading",
    "cluster_upgrades",
    "updating_machines",
    "updating_clusters_overview",
];

/// Guides listed for a product, with display names.
const STANDARD_GUIDES: &[(&str, &str)] = &[
    ("installation_overview", "Installation Overview"),
    ("getting_started", "Getting Started"),
    ("user_guide", "User Guide"),
    ("administration_guide", "Administration Guide"),
    ("release_notes", "Release Notes"),
];

const OPENSHIFT_GUIDES: &[(&str, &str)] = &[
    ("updating_clusters", "Updating Clusters"),
    ("updating_machines_in_a_cluster", "Updating Machines in a Cluster"),
    ("post_installation_configuration", "Post-installation Configuration"),
    ("installing_on_aws", "Installing on AWS"),
    ("installing_on_azure", "Installing on Azure"),
    ("installing_on_oci", "Installing on OCI"),
    ("edge_computing", "Edge Computing"),
    ("scalability_and_performance", "Scalability and Performance"),
];

/// How many of a product's newest versions a search covers.
const SEARCH_VERSIONS: usize = 3;

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListProductsParams {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchDocumentationParams {
    #[schemars(description = "Search terms, matched against product names")]
    pub query: String,

    #[schemars(description = "Only products whose key contains this")]
    #[serde(default)]
    pub product: Option<String>,

    #[schemars(description = "Only versions containing this")]
    #[serde(default)]
    pub version: Option<String>,

    #[schemars(description = "Maximum number of results (default: 10)")]
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetProductGuidesParams {
    #[schemars(description = "Product key, e.g. openshift_container_platform (substring match)")]
    pub product: String,

    #[schemars(description = "Product version, or 'latest' (default)")]
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "latest".to_string()
}

pub struct ListProductsTool;

#[async_trait]
impl ToolDefinition for ListProductsTool {
    const NAME: &'static str = "list_products";
    const DESCRIPTION: &'static str =
        "List Red Hat products with published documentation and their versions.";
    type Params = ListProductsParams;

    async fn run(ctx: &ToolContext, _params: Self::Params) -> Result<Value, ToolError> {
        let index = fetch_products(ctx.docs()?).await?;
        let products = describe_products(&index);
        Ok(json!({
            "total_products": products.len(),
            "products": products,
        }))
    }
}

pub struct SearchDocumentationTool;

#[async_trait]
impl ToolDefinition for SearchDocumentationTool {
    const NAME: &'static str = "search_documentation";
    const DESCRIPTION: &'static str = "Search Red Hat documentation. Query terms are matched \
         against product names and common guides of the newest versions are returned.";
    type Params = SearchDocumentationParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        search(ctx, &params).await
    }
}

pub struct GetProductGuidesTool;

#[async_trait]
impl ToolDefinition for GetProductGuidesTool {
    const NAME: &'static str = "get_product_guides";
    const DESCRIPTION: &'static str =
        "List the documentation guides of a Red Hat product version.";
    type Params = GetProductGuidesParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        require_non_empty("product", &params.product)?;
        let client = ctx.docs()?;
        let index = fetch_products(client).await?;

        let (product, versions) = find_product(&index, &params.product).ok_or_else(|| {
            ToolError::invalid_arguments(format!(
                "Product '{}' not found. Available products: {}",
                params.product,
                index.keys().cloned().collect::<Vec<_>>().join(", ")
            ))
        })?;

        let version = if params.version == "latest" {
            latest_version(versions).unwrap_or("latest").to_string()
        } else if versions.contains(&params.version) {
            params.version.clone()
        } else {
            return Err(ToolError::invalid_arguments(format!(
                "Version '{}' not found for {}. Available versions: {}",
                params.version,
                product,
                versions.join(", ")
            )));
        };

        let base = guide_base(&site_root(client), product, &version);
        let mut guides: Vec<Value> = STANDARD_GUIDES
            .iter()
            .map(|(id, name)| guide_entry(&base, id, name))
            .collect();
        if product.to_lowercase().contains("openshift") {
            guides.extend(
                OPENSHIFT_GUIDES
                    .iter()
                    .map(|(id, name)| guide_entry(&base, id, name)),
            );
        }

        Ok(json!({
            "product": product,
            "version": version,
            "available_versions": versions,
            "total_guides": guides.len(),
            "guides": guides,
        }))
    }
}

/// Run a sitemap search; shared by the guidance tools.
pub(super) async fn search(
    ctx: &ToolContext,
    params: &SearchDocumentationParams,
) -> Result<Value, ToolError> {
    require_non_empty("query", &params.query)?;
    let client = ctx.docs()?;
    let index = fetch_products(client).await?;
    let results = search_index(
        &index,
        &site_root(client),
        &params.query,
        params.product.as_deref(),
        params.version.as_deref(),
        validate_limit(params.limit),
    );
    Ok(json!({
        "query": params.query,
        "filters": { "product": params.product, "version": params.version },
        "total_found": results.len(),
        "results": results,
    }))
}

/// Match query terms against product keys and emit guide links for the
/// newest versions of each matching product.
pub fn search_index(
    index: &ProductIndex,
    site: &str,
    query: &str,
    product_filter: Option<&str>,
    version_filter: Option<&str>,
    limit: usize,
) -> Vec<Value> {
    let query_lower = query.to_lowercase();
    let terms: Vec<&str> = query_lower.split_whitespace().collect();
    let product_filter = product_filter.map(str::to_lowercase);
    let mut results = Vec::new();

    for (product, versions) in index {
        let key = product.to_lowercase();
        if product_filter.as_deref().is_some_and(|f| !key.contains(f)) {
            continue;
        }
        if !terms.iter().any(|term| key.contains(term)) {
            continue;
        }

        let mut guides: Vec<&str> = Vec::new();
        if key.contains("openshift") && query_lower.contains("upgrade") {
            guides.extend(OPENSHIFT_UPGRADE_GUIDES);
        }
        guides.extend(COMMON_GUIDES);

        for version in newest_first(versions).into_iter().take(SEARCH_VERSIONS) {
            if version_filter.is_some_and(|v| !version.contains(v)) {
                continue;
            }
            let base = guide_base(site, product, version);
            for guide in &guides {
                results.push(json!({
                    "title": format!("{} {} - {}", title_case(product), version, title_case(guide)),
                    "product": product,
                    "version": version,
                    "guide": guide,
                    "html_url": format!("{base}/html/{guide}/index"),
                    "pdf_url": format!("{base}/pdf/{guide}/index"),
                    "relevance_score": 1.0,
                }));
                if results.len() >= limit {
                    return results;
                }
            }
        }
    }
    results
}

/// Product entries for every discovered product plus the well-known ones.
fn describe_products(index: &ProductIndex) -> Map<String, Value> {
    let mut products = Map::new();
    for (key, name, description) in WELL_KNOWN_PRODUCTS {
        products.insert(
            (*key).to_string(),
            json!({
                "name": name,
                "description": description,
                "versions": index.get(*key).cloned().unwrap_or_default(),
            }),
        );
    }
    for (key, versions) in index {
        if products.contains_key(key) {
            continue;
        }
        products.insert(
            key.clone(),
            json!({
                "name": title_case(key),
                "description": "Red Hat product documentation",
                "versions": versions,
            }),
        );
    }
    products
}

/// Exact (case-insensitive) match first, then substring.
fn find_product<'a>(index: &'a ProductIndex, wanted: &str) -> Option<(&'a str, &'a Vec<String>)> {
    let wanted = wanted.to_lowercase();
    index
        .iter()
        .find(|(key, _)| key.to_lowercase() == wanted)
        .or_else(|| index.iter().find(|(key, _)| key.to_lowercase().contains(&wanted)))
        .map(|(key, versions)| (key.as_str(), versions))
}

/// A version labelled `latest`, else the highest `major.minor`, else the
/// first listed.
fn latest_version(versions: &[String]) -> Option<&str> {
    if let Some(v) = versions.iter().find(|v| v.contains("latest")) {
        return Some(v);
    }
    versions
        .iter()
        .filter_map(|v| major_minor(v).map(|mm| (mm, v)))
        .max_by_key(|(mm, _)| *mm)
        .map(|(_, v)| v.as_str())
        .or_else(|| versions.first().map(String::as_str))
}

fn guide_base(site: &str, product: &str, version: &str) -> String {
    format!("{site}/en/documentation/{product}/{version}")
}

fn guide_entry(base: &str, id: &str, name: &str) -> Value {
    json!({
        "name": name,
        "id": id,
        "html_url": format!("{base}/html/{id}/index"),
        "pdf_url": format!("{base}/pdf/{id}/index"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::docs::mock::{docs_context, site};
    use crate::domains::tools::definitions::invoke;
    use crate::domains::tools::definitions::testing::{args, error_text, structured};

    fn index() -> ProductIndex {
        let mut index = ProductIndex::new();
        index.insert(
            "openshift_container_platform".into(),
            vec!["4.16".into(), "4.17".into(), "4.18".into(), "4.9".into()],
        );
        index.insert("red_hat_enterprise_linux".into(), vec!["8".into(), "9".into()]);
        index
    }

    #[test]
    fn test_search_newest_versions_first() {
        let results = search_index(&index(), "https://docs.redhat.com", "openshift", None, None, 100);
        // Three versions, five common guides each.
        assert_eq!(results.len(), 15);
        assert_eq!(results[0]["version"], "4.18");
        assert_eq!(results[5]["version"], "4.17");
        assert_eq!(results[10]["version"], "4.16");
        assert_eq!(
            results[0]["title"],
            "Openshift Container Platform 4.18 - Installation Overview"
        );
        assert_eq!(
            results[0]["html_url"],
            "https://docs.redhat.com/en/documentation/openshift_container_platform/4.18/html/installation_overview/index"
        );
    }

    #[test]
    fn test_search_upgrade_guides_and_limit() {
        let results = search_index(&index(), "https://d", "openshift upgrade", None, None, 3);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0]["guide"], "updating_clusters");
        assert_eq!(results[2]["guide"], "cluster_upgrades");
    }

    #[test]
    fn test_search_filters() {
        let results = search_index(&index(), "https://d", "linux openshift", Some("linux"), None, 100);
        assert!(results.iter().all(|r| r["product"] == "red_hat_enterprise_linux"));

        let results = search_index(&index(), "https://d", "openshift", None, Some("4.17"), 100);
        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| r["version"] == "4.17"));

        assert!(search_index(&index(), "https://d", "satellite", None, None, 10).is_empty());
    }

    #[test]
    fn test_latest_version() {
        let v = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(latest_version(&v(&["4.9", "4.18", "4.17"])), Some("4.18"));
        assert_eq!(latest_version(&v(&["2.4", "latest-dev"])), Some("latest-dev"));
        assert_eq!(latest_version(&v(&["9", "8"])), Some("9"));
        assert_eq!(latest_version(&[]), None);
    }

    #[test]
    fn test_find_product() {
        let index = index();
        assert_eq!(find_product(&index, "OPENSHIFT").map(|p| p.0), Some("openshift_container_platform"));
        assert!(find_product(&index, "satellite").is_none());
    }

    #[tokio::test]
    async fn test_list_products_from_sitemaps() {
        let base = site().await;
        let ctx = docs_context(&base);

        let result = invoke::<ListProductsTool>(&ctx, args(json!({}))).await;
        let value = structured(&result);
        let products = value["products"].as_object().unwrap();
        // Four well-known products plus the discovered AI product.
        assert_eq!(value["total_products"], 5);
        assert_eq!(
            products["openshift_container_platform"]["versions"],
            json!(["4.16", "4.17", "4.18", "4.9"])
        );
        assert_eq!(products["red_hat_satellite"]["versions"], json!([]));
        assert_eq!(
            products["red_hat_openshift_ai_self-managed"]["name"],
            "Red Hat Openshift Ai Self-managed"
        );
    }

    #[tokio::test]
    async fn test_search_documentation_tool() {
        let base = site().await;
        let ctx = docs_context(&base);

        let result = invoke::<SearchDocumentationTool>(
            &ctx,
            args(json!({"query": "enterprise linux", "limit": 4})),
        )
        .await;
        let value = structured(&result);
        assert_eq!(value["total_found"], 4);
        assert_eq!(value["results"][0]["product"], "red_hat_enterprise_linux");
        assert!(
            value["results"][0]["html_url"]
                .as_str()
                .unwrap()
                .starts_with(&format!("{base}/en/documentation/red_hat_enterprise_linux/"))
        );
    }

    #[tokio::test]
    async fn test_get_product_guides() {
        let base = site().await;
        let ctx = docs_context(&base);

        let result = invoke::<GetProductGuidesTool>(
            &ctx,
            args(json!({"product": "openshift_container"})),
        )
        .await;
        let value = structured(&result);
        assert_eq!(value["product"], "openshift_container_platform");
        assert_eq!(value["version"], "4.18");
        assert_eq!(value["total_guides"], 13);

        let result = invoke::<GetProductGuidesTool>(
            &ctx,
            args(json!({"product": "red_hat_enterprise_linux", "version": "7"})),
        )
        .await;
        assert!(error_text(&result).contains("Version '7' not found"));

        let result = invoke::<GetProductGuidesTool>(&ctx, args(json!({"product": "jboss"}))).await;
        assert!(error_text(&result).contains("Product 'jboss' not found"));
    }
}
