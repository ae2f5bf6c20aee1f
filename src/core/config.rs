//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure populated
//! from environment variables (optionally via a `.env` file) with defaults.
//! The configuration is built once at start and shared immutably.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Main configuration structure for the MCP server.
///
/// This struct contains all configurable aspects of the server, organized
/// by upstream and concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Tool groups exposed by this process.
    pub toolsets: Vec<Toolset>,

    /// Automation controller API.
    pub controller: UpstreamConfig,

    /// Event-Driven Ansible API.
    pub eda: UpstreamConfig,

    /// Galaxy API.
    pub galaxy: UpstreamConfig,

    /// ansible-lint subprocess settings.
    pub lint: LintConfig,

    /// Red Hat documentation site.
    pub docs: DocsConfig,

    /// Security and path validation configuration.
    pub security: SecurityConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Verbose mode forces debug logging regardless of `level`.
    pub verbose: bool,
}

impl LoggingConfig {
    /// The level actually applied to the subscriber.
    pub fn effective_level(&self) -> &str {
        if self.verbose { "debug" } else { &self.level }
    }
}

/// A named group of tools backed by one upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toolset {
    Controller,
    Eda,
    Galaxy,
    Lint,
    Docs,
}

impl Toolset {
    pub const ALL: [Toolset; 5] = [
        Toolset::Controller,
        Toolset::Eda,
        Toolset::Galaxy,
        Toolset::Lint,
        Toolset::Docs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Toolset::Controller => "controller",
            Toolset::Eda => "eda",
            Toolset::Galaxy => "galaxy",
            Toolset::Lint => "lint",
            Toolset::Docs => "docs",
        }
    }

    /// Parse a comma separated list, ignoring blanks and unknown names.
    pub fn parse_list(raw: &str) -> Vec<Toolset> {
        let mut out = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.parse::<Toolset>() {
                Ok(t) if !out.contains(&t) => out.push(t),
                Ok(_) => {}
                Err(e) => warn!("{}", e),
            }
        }
        out
    }
}

impl FromStr for Toolset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "controller" | "aap" => Ok(Toolset::Controller),
            "eda" => Ok(Toolset::Eda),
            "galaxy" => Ok(Toolset::Galaxy),
            "lint" | "ansible-lint" => Ok(Toolset::Lint),
            "docs" | "redhat-docs" => Ok(Toolset::Docs),
            other => Err(format!("Unknown toolset '{}' ignored", other)),
        }
    }
}

/// Base URL and credential for a REST upstream.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// API root, e.g. `https://aap.example.com/api/controller/v2`.
    pub base_url: Option<String>,

    /// Bearer token.
    pub token: Option<String>,
}

impl UpstreamConfig {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            token,
        }
    }
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Settings for the `ansible-lint` subprocess.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintConfig {
    /// Executable name or path.
    pub binary: String,

    /// Hard limit for one linter invocation.
    pub timeout_secs: u64,
}

impl LintConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            binary: "ansible-lint".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Settings for the documentation toolset.
#[derive(Clone, Serialize, Deserialize)]
pub struct DocsConfig {
    /// Documentation site root.
    pub base_url: String,

    /// Optional customer portal username.
    pub username: Option<String>,

    /// Optional customer portal password.
    pub password: Option<String>,

    /// Hosts allowed in addition to the built-in Red Hat list.
    pub extra_domains: Vec<String>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://docs.redhat.com".to_string(),
            username: None,
            password: None,
            extra_domains: Vec::new(),
        }
    }
}

impl std::fmt::Debug for DocsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocsConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("extra_domains", &self.extra_domains)
            .finish()
    }
}

/// Configuration for security and path validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Optional root directory for paths handed to the linter.
    /// If None, no path restrictions are enforced.
    pub root_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "ansible-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                verbose: false,
            },
            transport: TransportConfig::default(),
            toolsets: Toolset::ALL.to_vec(),
            controller: UpstreamConfig::default(),
            eda: UpstreamConfig::default(),
            galaxy: UpstreamConfig::new("https://galaxy.ansible.com", None),
            lint: LintConfig::default(),
            docs: DocsConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a toolset is exposed by this process.
    pub fn is_enabled(&self, toolset: Toolset) -> bool {
        self.toolsets.contains(&toolset)
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honoured. Server settings
    /// use the `MCP_` prefix; upstream credentials use the names the
    /// platform tooling already uses (`AAP_URL`, `EDA_TOKEN`, ...).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Some(name) = env_var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Some(level) = env_var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(verbose) = env_var("MCP_VERBOSE") {
            config.logging.verbose = parse_flag(&verbose);
        }

        if let Some(raw) = env_var("MCP_TOOLSETS") {
            let toolsets = Toolset::parse_list(&raw);
            if toolsets.is_empty() {
                warn!("MCP_TOOLSETS did not name any known toolset, enabling all");
            } else {
                config.toolsets = toolsets;
            }
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        config.controller = UpstreamConfig {
            base_url: env_var("AAP_URL"),
            token: env_var("AAP_TOKEN"),
        };
        if config.is_enabled(Toolset::Controller) && config.controller.base_url.is_none() {
            warn!("AAP_URL not set - controller tools will report a configuration error");
        }

        config.eda = UpstreamConfig {
            base_url: env_var("EDA_URL"),
            token: env_var("EDA_TOKEN"),
        };
        if config.is_enabled(Toolset::Eda) && config.eda.base_url.is_none() {
            warn!("EDA_URL not set - EDA tools will report a configuration error");
        }

        if let Some(url) = env_var("GALAXY_URL") {
            config.galaxy.base_url = Some(url);
        }
        config.galaxy.token = env_var("GALAXY_TOKEN");

        if let Some(binary) = env_var("ANSIBLE_LINT_BIN") {
            config.lint.binary = binary;
        }
        if let Some(secs) = env_var("ANSIBLE_LINT_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(secs) if secs > 0 => config.lint.timeout_secs = secs,
                _ => warn!("Ignoring invalid ANSIBLE_LINT_TIMEOUT_SECS: {}", secs),
            }
        }

        if let Some(url) = env_var("REDHAT_DOCS_URL") {
            config.docs.base_url = url;
        }
        config.docs.username = env_var("REDHAT_USERNAME");
        config.docs.password = env_var("REDHAT_PASSWORD");
        if let Some(extra) = env_var("REDHAT_DOCS_EXTRA_DOMAINS") {
            config.docs.extra_domains = extra
                .split(',')
                .map(|d| d.trim().to_ascii_lowercase())
                .filter(|d| !d.is_empty())
                .collect();
        }

        // Load security configuration
        if let Some(root_path) = env_var("MCP_ROOT_PATH") {
            config.security.root_path = Some(PathBuf::from(root_path));
            info!(
                "Path security enabled: root directory set to {:?}",
                config.security.root_path
            );
        }

        config
    }
}

/// Read a non-empty environment variable.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "AAP_URL",
        "AAP_TOKEN",
        "EDA_URL",
        "EDA_TOKEN",
        "MCP_TOOLSETS",
        "MCP_VERBOSE",
        "ANSIBLE_LINT_TIMEOUT_SECS",
        "REDHAT_DOCS_EXTRA_DOMAINS",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    fn test_upstreams_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_env();
        unsafe {
            std::env::set_var("AAP_URL", "https://aap.lab/api/controller/v2");
            std::env::set_var("AAP_TOKEN", "secret-token");
            std::env::set_var("EDA_URL", "https://aap.lab/api/eda/v1");
        }
        let config = Config::from_env();
        assert_eq!(
            config.controller.base_url.as_deref(),
            Some("https://aap.lab/api/controller/v2")
        );
        assert_eq!(config.controller.token.as_deref(), Some("secret-token"));
        assert_eq!(
            config.eda.base_url.as_deref(),
            Some("https://aap.lab/api/eda/v1")
        );
        assert!(config.eda.token.is_none());
        clear_env();
    }

    #[test]
    fn test_missing_upstream_is_none() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_env();
        let config = Config::from_env();
        assert!(config.controller.base_url.is_none());
        assert_eq!(
            config.galaxy.base_url.as_deref(),
            Some("https://galaxy.ansible.com")
        );
    }

    #[test]
    fn test_toolsets_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_env();
        unsafe {
            std::env::set_var("MCP_TOOLSETS", "lint, docs,bogus,lint");
        }
        let config = Config::from_env();
        assert_eq!(config.toolsets, vec![Toolset::Lint, Toolset::Docs]);
        assert!(!config.is_enabled(Toolset::Controller));
        clear_env();
    }

    #[test]
    fn test_verbose_flag_forces_debug() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_env();
        unsafe {
            std::env::set_var("MCP_VERBOSE", "true");
        }
        let config = Config::from_env();
        assert!(config.logging.verbose);
        assert_eq!(config.logging.effective_level(), "debug");
        clear_env();
    }

    #[test]
    fn test_lint_timeout_and_extra_domains() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_env();
        unsafe {
            std::env::set_var("ANSIBLE_LINT_TIMEOUT_SECS", "5");
            std::env::set_var("REDHAT_DOCS_EXTRA_DOMAINS", "Mirror.Lab, ,docs.internal");
        }
        let config = Config::from_env();
        assert_eq!(config.lint.timeout(), Duration::from_secs(5));
        assert_eq!(config.docs.extra_domains, vec!["mirror.lab", "docs.internal"]);
        clear_env();
    }

    #[test]
    fn test_credentials_redacted_in_debug() {
        let upstream = UpstreamConfig::new("https://aap.lab", Some("super_secret_key".into()));
        let debug_str = format!("{:?}", upstream);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super_secret_key"));

        let docs = DocsConfig {
            password: Some("hunter2".into()),
            ..DocsConfig::default()
        };
        assert!(!format!("{:?}", docs).contains("hunter2"));
    }

    #[test]
    fn test_default_enables_all_toolsets() {
        let config = Config::default();
        for toolset in Toolset::ALL {
            assert!(config.is_enabled(toolset));
        }
        assert_eq!(config.lint.timeout_secs, 60);
    }
}
