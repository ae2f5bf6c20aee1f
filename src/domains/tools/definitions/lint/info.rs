//! Linter introspection: rules, tags and version.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::domains::tools::ToolError;
use crate::domains::tools::context::ToolContext;
use crate::domains::tools::definitions::ToolDefinition;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListRulesParams {
    #[schemars(description = "Comma-separated tags to filter the rule list")]
    #[serde(default)]
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct NoParams {}

pub struct ListRulesTool;

#[async_trait]
impl ToolDefinition for ListRulesTool {
    const NAME: &'static str = "list_rules";
    const DESCRIPTION: &'static str = "List the rules ansible-lint knows, optionally filtered by tag.";
    type Params = ListRulesParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        let tags = params.tags.filter(|t| !t.trim().is_empty());
        let mut args = vec!["--list-rules".to_string()];
        if let Some(tags) = &tags {
            args.push("--tags".to_string());
            args.push(tags.clone());
        }
        let output = ctx.lint().run_checked(&args).await?;
        Ok(json!({
            "rules_output": output.stdout,
            "tags_filter": tags,
        }))
    }
}

pub struct ListTagsTool;

#[async_trait]
impl ToolDefinition for ListTagsTool {
    const NAME: &'static str = "list_tags";
    const DESCRIPTION: &'static str = "List the rule tags ansible-lint knows.";
    type Params = NoParams;

    async fn run(ctx: &ToolContext, _params: Self::Params) -> Result<Value, ToolError> {
        let output = ctx.lint().run_checked(&["--list-tags".to_string()]).await?;
        Ok(json!({ "tags_output": output.stdout }))
    }
}

pub struct GetAnsibleLintVersionTool;

#[async_trait]
impl ToolDefinition for GetAnsibleLintVersionTool {
    const NAME: &'static str = "get_ansible_lint_version";
    const DESCRIPTION: &'static str =
        "Report whether ansible-lint is installed and which version it is.";
    type Params = NoParams;

    async fn run(ctx: &ToolContext, _params: Self::Params) -> Result<Value, ToolError> {
        if ctx.lint().locate().is_none() {
            return Ok(json!({
                "available": false,
                "error": "ansible-lint is not installed. Please install it with: pip install ansible-lint",
            }));
        }
        let output = ctx.lint().run_checked(&["--version".to_string()]).await?;
        Ok(json!({
            "available": true,
            "version": parse_version(&output.stdout),
            "version_info": output.stdout.trim(),
        }))
    }
}

/// Version number from `ansible-lint --version` output, e.g.
/// `ansible-lint 24.2.0 using ansible-core:2.16.3` gives `24.2.0`.
fn parse_version(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .next()?
        .split_whitespace()
        .find(|word| word.chars().next().is_some_and(|c| c.is_ascii_digit()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(
            parse_version("ansible-lint 24.2.0 using ansible-core:2.16.3 ansible-compat:4.1.11\n"),
            Some("24.2.0".to_string())
        );
        assert_eq!(parse_version(""), None);
        assert_eq!(parse_version("unknown"), None);
    }

    #[cfg(unix)]
    mod with_fake_linter {
        use super::*;
        use crate::domains::tools::definitions::invoke;
        use crate::domains::tools::definitions::lint::runner::tests::fake_linter;
        use crate::domains::tools::definitions::testing::{args, context, structured};
        use tempfile::TempDir;

        #[tokio::test]
        async fn test_version_reports_missing_binary() {
            let ctx = context(|c| c.lint.binary = "/nonexistent/ansible-lint".into());
            let result = invoke::<GetAnsibleLintVersionTool>(&ctx, args(json!({}))).await;
            let value = structured(&result);
            assert_eq!(value["available"], false);
        }

        #[tokio::test]
        async fn test_version_parses_output() {
            let dir = TempDir::new().unwrap();
            let bin = fake_linter(&dir, "echo 'ansible-lint 6.22.1 using ansible-core:2.15.8'");
            let ctx = context(|c| c.lint.binary = bin);
            let result = invoke::<GetAnsibleLintVersionTool>(&ctx, args(json!({}))).await;
            let value = structured(&result);
            assert_eq!(value["available"], true);
            assert_eq!(value["version"], "6.22.1");
        }

        #[tokio::test]
        async fn test_list_rules_passes_tag_filter() {
            let dir = TempDir::new().unwrap();
            let bin = fake_linter(&dir, "echo \"$@\"");
            let ctx = context(|c| c.lint.binary = bin);
            let result = invoke::<ListRulesTool>(&ctx, args(json!({"tags": "idiom"}))).await;
            let value = structured(&result);
            assert_eq!(value["rules_output"].as_str().unwrap().trim(), "--list-rules --tags idiom");
            assert_eq!(value["tags_filter"], "idiom");
        }

        #[tokio::test]
        async fn test_list_tags() {
            let dir = TempDir::new().unwrap();
            let bin = fake_linter(&dir, "echo 'command-shell # Specific to use of command and shell modules'");
            let ctx = context(|c| c.lint.binary = bin);
            let result = invoke::<ListTagsTool>(&ctx, args(json!({}))).await;
            let value = structured(&result);
            assert!(value["tags_output"].as_str().unwrap().starts_with("command-shell"));
        }
    }
}
