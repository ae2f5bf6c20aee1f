//! Documentation domain allow-list resource.

use serde_json::{Value, json};

use super::ResourceDefinition;
use crate::core::config::Config;
use crate::core::security::domain_policy::{DOMAIN_PATTERNS, OFFICIAL_DOMAINS};
use crate::domains::resources::ResourceError;

pub struct AllowedDomainsResource;

impl ResourceDefinition for AllowedDomainsResource {
    const URI: &'static str = "ansible://docs/allowed-domains";
    const NAME: &'static str = "Allowed Documentation Domains";
    const DESCRIPTION: &'static str =
        "Hosts the documentation tools may fetch from: official domains, subdomain patterns and configured extras";

    fn read(config: &Config) -> Result<Value, ResourceError> {
        Ok(json!({
            "official_domains": OFFICIAL_DOMAINS,
            "patterns": DOMAIN_PATTERNS,
            "extra_domains": config.docs.extra_domains,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_domains_lists_extras() {
        let mut config = Config::default();
        config.docs.extra_domains = vec!["mirror.internal".to_string()];

        let value = AllowedDomainsResource::read(&config).unwrap();
        let official = value["official_domains"].as_array().unwrap();
        assert!(official.contains(&json!("docs.redhat.com")));
        assert!(!value["patterns"].as_array().unwrap().is_empty());
        assert_eq!(value["extra_domains"], json!(["mirror.internal"]));
    }
}
