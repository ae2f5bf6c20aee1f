//! Tools linting inline YAML content.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{
    base_args, check_format, check_profile, default_format, default_profile, issue_count,
    parse_output, rule_id, summary,
};
use crate::domains::tools::ToolError;
use crate::domains::tools::context::ToolContext;
use crate::domains::tools::definitions::ToolDefinition;
use crate::domains::tools::definitions::common::require_non_empty;

// ============================================================================
// Tool Parameters
// ============================================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LintPlaybookParams {
    #[schemars(description = "YAML content of the playbook")]
    pub content: String,

    #[schemars(description = "Quality profile: min, basic, moderate, safety, shared, production")]
    #[serde(default = "default_profile")]
    pub profile: String,

    #[schemars(description = "Output format: json, brief, full, sarif, pep8, codeclimate, quiet")]
    #[serde(default = "default_format")]
    pub format_type: String,

    #[schemars(description = "Only run rules with these tags")]
    #[serde(default)]
    pub rules: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ValidateSyntaxParams {
    #[schemars(description = "YAML content to validate")]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CheckBestPracticesParams {
    #[schemars(description = "YAML content to check")]
    pub content: String,

    #[schemars(description = "Deployment context: development, staging or production")]
    #[serde(default = "default_context")]
    pub context: String,

    #[schemars(description = "Rules to skip")]
    #[serde(default)]
    pub exclude_rules: Option<Vec<String>>,
}

fn default_context() -> String {
    "production".to_string()
}

// ============================================================================
// Tools
// ============================================================================

pub struct LintPlaybookTool;

#[async_trait]
impl ToolDefinition for LintPlaybookTool {
    const NAME: &'static str = "lint_playbook";
    const DESCRIPTION: &'static str =
        "Lint Ansible playbook content and return the issues found.";
    type Params = LintPlaybookParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        require_non_empty("content", &params.content)?;
        check_format(&params.format_type)?;
        check_profile(&params.profile)?;

        let mut args = base_args(&params.format_type, &params.profile);
        if let Some(rules) = params.rules.filter(|r| !r.is_empty()) {
            args.push("--tags".to_string());
            args.push(rules.join(","));
        }

        let output = ctx.lint().run_on_content(&args, &params.content).await?;
        let issues = parse_output(&output.stdout, &params.format_type);

        Ok(json!({
            "summary": summary(&issues, output.return_code),
            "issues": issues,
            "profile_used": params.profile,
            "format": params.format_type,
        }))
    }
}

pub struct ValidateSyntaxTool;

#[async_trait]
impl ToolDefinition for ValidateSyntaxTool {
    const NAME: &'static str = "validate_syntax";
    const DESCRIPTION: &'static str = "Quick syntax validation of Ansible YAML content.";
    type Params = ValidateSyntaxParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        require_non_empty("content", &params.content)?;

        let args = vec![
            "--format=json".to_string(),
            "--tags".to_string(),
            "syntax".to_string(),
        ];
        let output = ctx.lint().run_on_content(&args, &params.content).await?;
        let parsed = parse_output(&output.stdout, "json");

        let syntax_issues: Vec<Value> = parsed
            .as_array()
            .map(|issues| {
                issues
                    .iter()
                    .filter(|issue| is_syntax_issue(issue))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(json!({
            "syntax_valid": syntax_issues.is_empty(),
            "summary": { "total_syntax_issues": syntax_issues.len() },
            "syntax_issues": syntax_issues,
        }))
    }
}

pub struct CheckBestPracticesTool;

#[async_trait]
impl ToolDefinition for CheckBestPracticesTool {
    const NAME: &'static str = "check_best_practices";
    const DESCRIPTION: &'static str = "Check Ansible content against best practices for a \
         deployment context and categorise the issues by severity.";
    type Params = CheckBestPracticesParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        require_non_empty("content", &params.content)?;

        let profile = profile_for_context(&params.context);
        let mut args = base_args("json", profile);
        if let Some(rules) = params.exclude_rules.filter(|r| !r.is_empty()) {
            args.push("--skip-list".to_string());
            args.push(rules.join(","));
        }

        let output = ctx.lint().run_on_content(&args, &params.content).await?;
        let parsed = parse_output(&output.stdout, "json");
        let categories = categorize(&parsed, &params.context);

        let count = |key: &str| categories[key].as_array().map_or(0, Vec::len);
        let blocking = count("critical") + count("major");

        Ok(json!({
            "context": params.context,
            "profile_used": profile,
            "summary": {
                "total_issues": issue_count(&parsed),
                "critical": count("critical"),
                "major": count("major"),
                "minor": count("minor"),
                "info": count("info"),
            },
            "recommendations": {
                "ready_for_production": blocking == 0,
                "next_steps": if blocking > 0 {
                    "Fix critical and major issues before deploying to production"
                } else {
                    "Code meets basic quality standards"
                },
            },
            "categorized_issues": categories,
            "all_issues": parsed,
        }))
    }
}

/// Map a deployment context to a lint profile.
pub fn profile_for_context(context: &str) -> &'static str {
    match context {
        "development" => "basic",
        "staging" => "moderate",
        "production" => "production",
        _ => "basic",
    }
}

fn is_syntax_issue(issue: &Value) -> bool {
    let tag = issue.get("tag").and_then(Value::as_str).unwrap_or_default();
    let in_categories = issue
        .get("categories")
        .and_then(Value::as_array)
        .is_some_and(|c| c.iter().any(|v| v.as_str().is_some_and(|s| s.contains("syntax"))));
    tag.to_lowercase().contains("syntax") || rule_id(issue).contains("syntax") || in_categories
}

/// Sort issues into critical / major / minor / info.
///
/// Load and syntax failures are critical; shell and command misuse is major
/// in production; naming and YAML style are minor; the rest is info.
fn categorize(parsed: &Value, context: &str) -> Value {
    let mut critical = Vec::new();
    let mut major = Vec::new();
    let mut minor = Vec::new();
    let mut info = Vec::new();

    for issue in parsed.as_array().into_iter().flatten() {
        if !issue.is_object() {
            continue;
        }
        let id = rule_id(issue);
        let bucket = if ["syntax-check", "load-failure"].iter().any(|r| id.contains(r)) {
            &mut critical
        } else if context == "production"
            && ["risky-shell-pipe", "command-instead-of-module"]
                .iter()
                .any(|r| id.contains(r))
        {
            &mut major
        } else if ["name", "yaml"].iter().any(|r| id.contains(r)) {
            &mut minor
        } else {
            &mut info
        };
        bucket.push(issue.clone());
    }

    json!({
        "critical": critical,
        "major": major,
        "minor": minor,
        "info": info,
    })
}
