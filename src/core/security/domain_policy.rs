//! Host allow-list for URLs the documentation tools dereference.
//!
//! A URL is allowed when its host (lower-cased, leading `www.` removed) is
//! one of the official Red Hat hosts, matches one of the subdomain patterns,
//! or was added through configuration.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Official hosts accepted verbatim.
pub const OFFICIAL_DOMAINS: &[&str] = &[
    // Core documentation and portals
    "redhat.com",
    "docs.redhat.com",
    "access.redhat.com",
    "sso.redhat.com",
    "console.redhat.com",
    "cloud.redhat.com",
    "marketplace.redhat.com",
    "customer-portal.redhat.com",
    "connect.redhat.com",
    "catalog.redhat.com",
    "subscriptions.redhat.com",
    // Registries and CDNs
    "registry.redhat.com",
    "registry.access.redhat.com",
    "registry.connect.redhat.com",
    "registry.redhat.io",
    "quay.io",
    "cdn.quay.io",
    "cdn.redhat.com",
    "cdn-ubi.redhat.com",
    "download.redhat.com",
    // Product sites
    "openshift.com",
    "docs.openshift.com",
    "console.openshift.com",
    "try.openshift.com",
    "learn.openshift.com",
    "ansible.com",
    "docs.ansible.com",
    "galaxy.ansible.com",
    "automation-hub.redhat.com",
    // Developer and community
    "opensource.com",
    "redhat.io",
    "developers.redhat.com",
    "research.redhat.com",
    "enable.redhat.com",
    "blog.redhat.com",
    "npm.registry.redhat.com",
    "insights.redhat.com",
    "hybrid-cloud-console.redhat.com",
    "support.redhat.com",
    "labs.redhat.com",
    "training.redhat.com",
    "learn.redhat.com",
    "summit.redhat.com",
    "events.redhat.com",
    "community.redhat.com",
    "partnerships.redhat.com",
    // Security advisories
    "security.redhat.com",
    "errata.redhat.com",
    "cve.redhat.com",
    // Corporate
    "investors.redhat.com",
    "jobs.redhat.com",
    "careers.redhat.com",
    "redhat.force.com",
];

/// Subdomain patterns, matched against the whole host.
pub const DOMAIN_PATTERNS: &[&str] = &[
    r"^.*\.redhat\.com$",
    r"^.*\.redhat\.io$",
    r"^.*\.openshift\.com$",
    r"^.*\.ansible\.com$",
    r"^.*\.quay\.io$",
    r"^cdn.*\.redhat\.com$",
    r"^registry.*\.redhat\.com$",
    r"^.*\.redhat\.force\.com$",
    r"^download.*\.redhat\.com$",
    r"^.*\.rhel\.com$",
];

static COMPILED_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    DOMAIN_PATTERNS
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
});

/// Host allow-list with optional configured additions.
#[derive(Debug, Clone, Default)]
pub struct DomainPolicy {
    extra: Vec<String>,
}

impl DomainPolicy {
    /// Build a policy that also accepts `extra` hosts and their subdomains.
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extra: extra
                .into_iter()
                .map(|h| normalize_host(h.as_ref()))
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    /// Configured additional hosts.
    pub fn extra_domains(&self) -> &[String] {
        &self.extra
    }

    /// Whether `url` may be fetched. Unparseable URLs are rejected.
    pub fn is_allowed(&self, url: &str) -> bool {
        self.host_of(url).is_some_and(|host| self.is_host_allowed(&host))
    }

    /// Normalized host of an http(s) URL.
    pub fn host_of(&self, url: &str) -> Option<String> {
        let parsed = Url::parse(url.trim()).ok()?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return None;
        }
        parsed
            .host_str()
            .map(normalize_host)
            .filter(|h| !h.is_empty())
    }

    /// Check an already-normalized host.
    pub fn is_host_allowed(&self, host: &str) -> bool {
        if OFFICIAL_DOMAINS.contains(&host) {
            return true;
        }
        if COMPILED_PATTERNS.iter().any(|re| re.is_match(host)) {
            return true;
        }
        self.extra
            .iter()
            .any(|extra| host == extra || host.ends_with(&format!(".{extra}")))
    }
}

/// Default-policy convenience.
pub fn is_allowed(url: &str) -> bool {
    DomainPolicy::default().is_allowed(url)
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('.').to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}
