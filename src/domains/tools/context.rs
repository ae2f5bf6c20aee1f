//! Shared, immutable state handed to every tool call.

use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use crate::core::config::{Config, UpstreamConfig};
use crate::core::security::DomainPolicy;
use crate::core::upstream::{Auth, UpstreamClient};
use crate::domains::tools::ToolError;
use crate::domains::tools::definitions::lint::LintRunner;

/// Configuration plus one client per upstream, built once at start.
#[derive(Debug)]
pub struct ToolContext {
    config: Arc<Config>,
    controller: Option<UpstreamClient>,
    eda: Option<UpstreamClient>,
    galaxy: Option<UpstreamClient>,
    docs: Option<UpstreamClient>,
    lint: LintRunner,
    domains: DomainPolicy,
}

impl ToolContext {
    /// Build the context from configuration.
    ///
    /// Upstreams with a missing or unparseable URL are left unset; the tools
    /// that need them report a configuration error when called.
    pub fn new(config: Arc<Config>) -> Self {
        let controller = build_client(
            "AAP_URL",
            &config.controller,
            Auth::bearer(config.controller.token.as_deref()),
        );
        let eda = build_client("EDA_URL", &config.eda, Auth::bearer(config.eda.token.as_deref()));
        let galaxy = build_client(
            "GALAXY_URL",
            &config.galaxy,
            match &config.galaxy.token {
                Some(token) => Auth::Token(token.clone()),
                None => Auth::None,
            },
        );

        let docs_auth = match (&config.docs.username, &config.docs.password) {
            (Some(username), Some(password)) => Auth::Basic {
                username: username.clone(),
                password: password.clone(),
            },
            _ => Auth::None,
        };
        let docs = build_client(
            "REDHAT_DOCS_URL",
            &UpstreamConfig::new(config.docs.base_url.clone(), None),
            docs_auth,
        );

        let lint = LintRunner::new(config.lint.binary.clone(), config.lint.timeout());
        let domains = DomainPolicy::new(&config.docs.extra_domains);

        Self {
            config,
            controller,
            eda,
            galaxy,
            docs,
            lint,
            domains,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Automation controller client.
    pub fn controller(&self) -> Result<&UpstreamClient, ToolError> {
        self.controller
            .as_ref()
            .ok_or_else(|| ToolError::not_configured("AAP_URL/AAP_TOKEN"))
    }

    /// Event-Driven Ansible client.
    pub fn eda(&self) -> Result<&UpstreamClient, ToolError> {
        self.eda
            .as_ref()
            .ok_or_else(|| ToolError::not_configured("EDA_URL/EDA_TOKEN"))
    }

    /// Galaxy client.
    pub fn galaxy(&self) -> Result<&UpstreamClient, ToolError> {
        self.galaxy
            .as_ref()
            .ok_or_else(|| ToolError::not_configured("GALAXY_URL"))
    }

    /// Documentation site client.
    pub fn docs(&self) -> Result<&UpstreamClient, ToolError> {
        self.docs
            .as_ref()
            .ok_or_else(|| ToolError::not_configured("REDHAT_DOCS_URL"))
    }

    pub fn lint(&self) -> &LintRunner {
        &self.lint
    }

    pub fn domains(&self) -> &DomainPolicy {
        &self.domains
    }

    /// Root directory lint paths must stay inside, if any.
    pub fn root_path(&self) -> Option<&Path> {
        self.config.security.root_path.as_deref()
    }
}

fn build_client(var: &str, upstream: &UpstreamConfig, auth: Auth) -> Option<UpstreamClient> {
    let base_url = upstream.base_url.as_deref()?;
    match UpstreamClient::new(base_url, auth) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!("Ignoring {}: {}", var, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_upstreams_report_env_names() {
        let ctx = ToolContext::new(Arc::new(Config::default()));
        let err = ctx.controller().unwrap_err();
        assert!(err.to_string().contains("AAP_URL"));
        let err = ctx.eda().unwrap_err();
        assert!(err.to_string().contains("EDA_URL"));
        assert!(ctx.galaxy().is_ok());
        assert!(ctx.docs().is_ok());
    }

    #[test]
    fn test_bad_url_is_left_unset() {
        let mut config = Config::default();
        config.controller = UpstreamConfig::new("not a url", Some("t".into()));
        let ctx = ToolContext::new(Arc::new(config));
        assert!(ctx.controller().is_err());
    }

    #[test]
    fn test_extra_domains_reach_policy() {
        let mut config = Config::default();
        config.docs.extra_domains = vec!["127.0.0.1".into()];
        let ctx = ToolContext::new(Arc::new(config));
        assert!(ctx.domains().is_allowed("http://127.0.0.1:9000/x"));
    }
}
