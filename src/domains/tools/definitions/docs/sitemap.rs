//! Product and version discovery from the documentation sitemaps, plus the
//! URL shapes the docs site uses.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::core::upstream::UpstreamClient;
use crate::domains::tools::ToolError;

/// Product key → known versions.
pub type ProductIndex = BTreeMap<String, Vec<String>>;

const SITEMAP_INDEX_PATH: &str = "sitemaps/docs/docs-sitemap-index.xml";

/// Only the first few sitemaps are read; the full set is very large.
const MAX_SITEMAPS: usize = 3;

const PROTOCOL_RELATIVE_HOST: &str = "https://docs.redhat.com";

/// Fetch the sitemap index and build the product index from the first
/// sitemaps it lists. A failing child sitemap is skipped.
pub async fn fetch_products(client: &UpstreamClient) -> Result<ProductIndex, ToolError> {
    let index = client.fetch(SITEMAP_INDEX_PATH).await?.error_for_status()?;
    let base = site_root(client);

    let sitemaps: Vec<String> = extract_locs(&index.text())
        .into_iter()
        .map(|loc| absolutize(&loc, &base))
        .take(MAX_SITEMAPS)
        .collect();
    debug!(count = sitemaps.len(), "Reading sitemaps");

    let mut products: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for url in &sitemaps {
        let sitemap = match client.fetch(url).await.and_then(|r| r.error_for_status()) {
            Ok(sitemap) => sitemap,
            Err(e) => {
                warn!("Skipping sitemap {}: {}", url, e);
                continue;
            }
        };
        for loc in extract_locs(&sitemap.text()) {
            if let Some((product, version)) = product_version(&loc) {
                products
                    .entry(product.to_string())
                    .or_default()
                    .insert(version.to_string());
            }
        }
    }

    Ok(products
        .into_iter()
        .map(|(product, versions)| (product, versions.into_iter().collect()))
        .collect())
}

/// Site root without a trailing slash, e.g. `https://docs.redhat.com`.
pub fn site_root(client: &UpstreamClient) -> String {
    client.base_url().as_str().trim_end_matches('/').to_string()
}

/// Every `<loc>` value in a sitemap document.
pub fn extract_locs(xml: &str) -> Vec<String> {
    xml.split("<loc>")
        .skip(1)
        .filter_map(|chunk| chunk.split_once("</loc>"))
        .map(|(loc, _)| loc.trim().replace("&amp;", "&"))
        .filter(|loc| !loc.is_empty())
        .collect()
}

fn absolutize(loc: &str, base: &str) -> String {
    if let Some(rest) = loc.strip_prefix("//") {
        format!("{PROTOCOL_RELATIVE_HOST}/{rest}")
    } else if loc.starts_with('/') {
        format!("{base}{loc}")
    } else {
        loc.to_string()
    }
}

/// `(product, version)` from a `/documentation/{product}/{version}/` URL.
pub fn product_version(url: &str) -> Option<(&str, &str)> {
    let (_, rest) = url.split_once("/documentation/")?;
    let mut parts = rest.splitn(3, '/');
    let product = parts.next().filter(|p| !p.is_empty())?;
    let version = parts.next().filter(|v| !v.is_empty())?;
    // The version segment must be followed by a slash.
    parts.next()?;
    Some((product, version))
}

/// First `major.minor` pair in a version string.
pub fn major_minor(version: &str) -> Option<(u64, u64)> {
    for (dot, _) in version.match_indices('.') {
        let head = &version[..dot];
        let tail = &version[dot + 1..];
        let major_start = head
            .rfind(|c: char| !c.is_ascii_digit())
            .map_or(0, |p| p + 1);
        let minor_end = tail
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(tail.len());
        let (major, minor) = (&head[major_start..], &tail[..minor_end]);
        if !major.is_empty() && !minor.is_empty() {
            return Some((major.parse().ok()?, minor.parse().ok()?));
        }
    }
    None
}

/// Versions ordered newest first by `major.minor`; others sort last.
pub fn newest_first(versions: &[String]) -> Vec<&str> {
    let mut sorted: Vec<&str> = versions.iter().map(String::as_str).collect();
    sorted.sort_by_key(|v| std::cmp::Reverse(major_minor(v).unwrap_or((0, 0))));
    sorted
}

/// Convert an HTML guide URL (`.../html/{guide}/index`, `.../html-single/{guide}`)
/// into its PDF twin `.../pdf/{guide}/index`.
pub fn pdf_url(html_url: &str) -> Option<String> {
    let trimmed = html_url
        .strip_suffix("/index")
        .or_else(|| html_url.strip_suffix('/'))
        .unwrap_or(html_url);
    let (prefix, guide) = trimmed.rsplit_once('/')?;
    if guide.is_empty() {
        return None;
    }
    let root = prefix
        .strip_suffix("/html-single")
        .or_else(|| prefix.strip_suffix("/html"))?;
    Some(format!("{root}/pdf/{guide}/index"))
}

/// `red_hat_enterprise_linux` → `Red Hat Enterprise Linux`.
pub fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_locs() {
        let xml = r#"<?xml version="1.0"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>https://docs.redhat.com/sitemaps/a.xml</loc></sitemap>
  <sitemap><loc> /sitemaps/b.xml?x=1&amp;y=2 </loc></sitemap>
  <sitemap><loc></loc></sitemap>
</sitemapindex>"#;
        assert_eq!(
            extract_locs(xml),
            vec!["https://docs.redhat.com/sitemaps/a.xml", "/sitemaps/b.xml?x=1&y=2"]
        );
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(
            absolutize("//sitemaps/a.xml", "http://127.0.0.1:1"),
            "https://docs.redhat.com/sitemaps/a.xml"
        );
        assert_eq!(absolutize("/s.xml", "http://127.0.0.1:1"), "http://127.0.0.1:1/s.xml");
        assert_eq!(absolutize("https://x/s.xml", "http://b"), "https://x/s.xml");
    }

    #[test]
    fn test_product_version() {
        assert_eq!(
            product_version(
                "https://docs.redhat.com/en/documentation/openshift_container_platform/4.18/html/updating_clusters/index"
            ),
            Some(("openshift_container_platform", "4.18"))
        );
        assert_eq!(product_version("https://docs.redhat.com/en/documentation/rhel/9"), None);
        assert_eq!(product_version("https://docs.redhat.com/en/products"), None);
    }

    #[test]
    fn test_version_ordering() {
        assert_eq!(major_minor("4.18"), Some((4, 18)));
        assert_eq!(major_minor("v2.4-latest"), Some((2, 4)));
        assert_eq!(major_minor("9"), None);

        let versions = vec!["4.9".to_string(), "latest".to_string(), "4.18".to_string(), "3.11".to_string()];
        assert_eq!(newest_first(&versions), vec!["4.18", "4.9", "3.11", "latest"]);
    }

    #[test]
    fn test_pdf_url() {
        let base = "https://docs.redhat.com/en/documentation/openshift_container_platform/4.18";
        assert_eq!(
            pdf_url(&format!("{base}/html/updating_clusters/index")),
            Some(format!("{base}/pdf/updating_clusters/index"))
        );
        assert_eq!(
            pdf_url(&format!("{base}/html-single/updating_clusters")),
            Some(format!("{base}/pdf/updating_clusters/index"))
        );
        assert_eq!(
            pdf_url(&format!("{base}/html/updating_clusters/")),
            Some(format!("{base}/pdf/updating_clusters/index"))
        );
        assert_eq!(pdf_url(&format!("{base}/pdf/updating_clusters/index")), None);
        assert_eq!(pdf_url("https://access.redhat.com/solutions/12345"), None);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("red_hat_enterprise_linux"), "Red Hat Enterprise Linux");
        assert_eq!(title_case("release_notes"), "Release Notes");
    }
}
