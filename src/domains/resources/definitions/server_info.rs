//! Server info resource definition.

use serde_json::{Value, json};

use super::ResourceDefinition;
use crate::core::config::{Config, UpstreamConfig};
use crate::domains::resources::ResourceError;

/// Effective server configuration. Tokens and passwords are never included.
pub struct ServerInfoResource;

fn upstream(section: &UpstreamConfig) -> Value {
    json!({
        "base_url": section.base_url,
        "token_configured": section.token.is_some(),
    })
}

impl ResourceDefinition for ServerInfoResource {
    const URI: &'static str = "ansible://server/info";
    const NAME: &'static str = "Server Information";
    const DESCRIPTION: &'static str =
        "Server name, version, enabled toolsets and configured upstream endpoints";

    fn read(config: &Config) -> Result<Value, ResourceError> {
        let toolsets: Vec<&str> = config.toolsets.iter().map(|t| t.as_str()).collect();

        Ok(json!({
            "name": config.server.name,
            "version": config.server.version,
            "transport": config.transport.description(),
            "toolsets": toolsets,
            "controller": upstream(&config.controller),
            "eda": upstream(&config.eda),
            "galaxy": upstream(&config.galaxy),
            "docs": {
                "base_url": config.docs.base_url,
                "credentials_configured":
                    config.docs.username.is_some() && config.docs.password.is_some(),
            },
            "lint": {
                "binary": config.lint.binary,
                "timeout_secs": config.lint.timeout_secs,
            },
            "root_path": config.security.root_path,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Toolset;

    #[test]
    fn test_server_info_hides_secrets() {
        let config = Config {
            toolsets: vec![Toolset::Controller, Toolset::Docs],
            controller: UpstreamConfig::new("https://aap.example.com", Some("s3cr3t".into())),
            ..Config::default()
        };

        let info = ServerInfoResource::read(&config).unwrap();
        assert_eq!(info["toolsets"], json!(["controller", "docs"]));
        assert_eq!(info["controller"]["base_url"], "https://aap.example.com");
        assert_eq!(info["controller"]["token_configured"], true);
        assert!(info["eda"]["base_url"].is_null());
        assert!(!info.to_string().contains("s3cr3t"));
    }
}
