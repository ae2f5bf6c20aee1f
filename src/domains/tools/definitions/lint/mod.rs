//! ansible-lint toolset.
//!
//! Each tool builds an argument list, runs the linter through
//! [`LintRunner`] and parses its output. Exit code 2 ("violations found") is
//! a successful run.

mod content;
mod info;
mod paths;
mod runner;

use serde_json::{Value, json};

use crate::domains::tools::ToolError;
use crate::domains::tools::definitions::common::one_of;

pub use content::{CheckBestPracticesTool, LintPlaybookTool, ValidateSyntaxTool};
pub use info::{GetAnsibleLintVersionTool, ListRulesTool, ListTagsTool};
pub use paths::{AnalyzeProjectTool, LintFileTool, LintRoleTool};
pub use runner::{LintOutput, LintRunner};

toolset!(
    LintPlaybookTool,
    LintFileTool,
    LintRoleTool,
    ListRulesTool,
    ListTagsTool,
    ValidateSyntaxTool,
    CheckBestPracticesTool,
    AnalyzeProjectTool,
    GetAnsibleLintVersionTool,
);

/// Output formats accepted by `--format`.
pub const FORMATS: &[&str] = &[
    "json",
    "brief",
    "full",
    "sarif",
    "pep8",
    "codeclimate",
    "quiet",
];

/// Quality profiles accepted by `--profile`.
pub const PROFILES: &[&str] = &["min", "basic", "moderate", "safety", "shared", "production"];

fn default_profile() -> String {
    "basic".to_string()
}

fn default_format() -> String {
    "json".to_string()
}

fn check_format(format: &str) -> Result<(), ToolError> {
    one_of("format_type", format, FORMATS)
}

fn check_profile(profile: &str) -> Result<(), ToolError> {
    one_of("profile", profile, PROFILES)
}

/// `--format=F --profile P` prefix shared by the lint tools.
fn base_args(format: &str, profile: &str) -> Vec<String> {
    vec![
        format!("--format={format}"),
        "--profile".to_string(),
        profile.to_string(),
    ]
}

/// Parse linter stdout. JSON output becomes a value (empty output is an
/// empty list); other formats are returned raw.
pub fn parse_output(stdout: &str, format: &str) -> Value {
    if format != "json" {
        return json!({ "raw_output": stdout });
    }
    if stdout.trim().is_empty() {
        return json!([]);
    }
    serde_json::from_str(stdout).unwrap_or_else(|_| {
        json!({
            "error": "Failed to parse JSON output",
            "raw_output": stdout,
        })
    })
}

/// Number of issues in parsed output; non-list output counts as zero.
fn issue_count(parsed: &Value) -> usize {
    parsed.as_array().map_or(0, Vec::len)
}

/// Rule identifier of an issue, from `rule.id` or the codeclimate
/// `check_name`.
fn rule_id(issue: &Value) -> &str {
    issue
        .get("rule")
        .and_then(|r| r.get("id"))
        .or_else(|| issue.get("check_name"))
        .and_then(Value::as_str)
        .unwrap_or_default()
}

/// File an issue points at, from `filename` or `location.path`.
fn issue_file(issue: &Value) -> String {
    issue
        .get("filename")
        .or_else(|| issue.get("location").and_then(|l| l.get("path")))
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string()
}

fn summary(parsed: &Value, return_code: i32) -> Value {
    json!({
        "total_issues": issue_count(parsed),
        "return_code": return_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolset_names() {
        assert_eq!(names().len(), 9);
        assert!(names().contains(&"get_ansible_lint_version"));
    }

    #[test]
    fn test_parse_output() {
        assert_eq!(parse_output("", "json"), json!([]));
        assert_eq!(parse_output("[{\"a\":1}]", "json"), json!([{"a": 1}]));
        let broken = parse_output("not json", "json");
        assert_eq!(broken["raw_output"], "not json");
        assert!(broken.get("error").is_some());
        assert_eq!(parse_output("x.yml:1 fqcn", "pep8"), json!({"raw_output": "x.yml:1 fqcn"}));
    }

    #[test]
    fn test_issue_accessors_accept_both_shapes() {
        let legacy = json!({"rule": {"id": "yaml[truthy]"}, "filename": "site.yml"});
        let codeclimate = json!({"check_name": "name[missing]", "location": {"path": "roles/a/tasks/main.yml"}});
        assert_eq!(rule_id(&legacy), "yaml[truthy]");
        assert_eq!(rule_id(&codeclimate), "name[missing]");
        assert_eq!(issue_file(&legacy), "site.yml");
        assert_eq!(issue_file(&codeclimate), "roles/a/tasks/main.yml");
        assert_eq!(issue_file(&json!({})), "unknown");
    }

    #[test]
    fn test_argument_validation() {
        assert!(check_format("sarif").is_ok());
        assert!(check_format("xml").is_err());
        assert!(check_profile("production").is_ok());
        assert!(check_profile("strict").is_err());
    }
}
