//! Tools linting files, roles and whole projects on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::{
    base_args, check_format, check_profile, default_format, default_profile, issue_file,
    parse_output, summary,
};
use crate::core::security::{validate_dir, validate_path};
use crate::domains::tools::ToolError;
use crate::domains::tools::context::ToolContext;
use crate::domains::tools::definitions::ToolDefinition;

/// Standard role subdirectories reported by `lint_role`.
const ROLE_DIRS: &[&str] = &["tasks", "handlers", "vars", "defaults", "meta", "templates", "files"];

/// Top-level entries reported by `analyze_project`.
const PROJECT_ENTRIES: &[&str] = &[
    "playbooks",
    "roles",
    "inventory",
    "group_vars",
    "host_vars",
    "ansible.cfg",
    "requirements.yml",
    "site.yml",
];

const MOST_PROBLEMATIC: usize = 5;

fn default_project_profile() -> String {
    "moderate".to_string()
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LintFileParams {
    #[schemars(description = "Path to the YAML file to lint")]
    pub file_path: String,

    #[schemars(description = "Quality profile: min, basic, moderate, safety, shared, production")]
    #[serde(default = "default_profile")]
    pub profile: String,

    #[schemars(description = "Output format: json, brief, full, sarif, pep8, codeclimate, quiet")]
    #[serde(default = "default_format")]
    pub format_type: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LintRoleParams {
    #[schemars(description = "Path to the role directory")]
    pub role_path: String,

    #[schemars(description = "Quality profile: min, basic, moderate, safety, shared, production")]
    #[serde(default = "default_profile")]
    pub profile: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AnalyzeProjectParams {
    #[schemars(description = "Path to the Ansible project root")]
    pub project_path: String,

    #[schemars(
        description = "Quality profile: min, basic, moderate, safety, shared, production (default: moderate)"
    )]
    #[serde(default = "default_project_profile")]
    pub profile: String,
}

pub struct LintFileTool;

#[async_trait]
impl ToolDefinition for LintFileTool {
    const NAME: &'static str = "lint_file";
    const DESCRIPTION: &'static str = "Lint an Ansible file on disk.";
    type Params = LintFileParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        check_format(&params.format_type)?;
        check_profile(&params.profile)?;
        let path = validate_path(&params.file_path, ctx.root_path())?;
        if !path.is_file() {
            return Err(ToolError::invalid_arguments(format!(
                "'{}' is not a file",
                params.file_path
            )));
        }

        let mut args = base_args(&params.format_type, &params.profile);
        args.push(path.to_string_lossy().into_owned());
        let output = ctx.lint().run_checked(&args).await?;
        let issues = parse_output(&output.stdout, &params.format_type);

        Ok(json!({
            "file_path": path.display().to_string(),
            "summary": summary(&issues, output.return_code),
            "issues": issues,
            "profile_used": params.profile,
        }))
    }
}

pub struct LintRoleTool;

#[async_trait]
impl ToolDefinition for LintRoleTool {
    const NAME: &'static str = "lint_role";
    const DESCRIPTION: &'static str =
        "Lint an Ansible role directory and report which standard role directories it has.";
    type Params = LintRoleParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        check_profile(&params.profile)?;
        let path = validate_dir(&params.role_path, ctx.root_path())?;

        let mut args = base_args("json", &params.profile);
        args.push(path.to_string_lossy().into_owned());
        let output = ctx.lint().run_checked(&args).await?;
        let issues = parse_output(&output.stdout, "json");

        Ok(json!({
            "role_path": path.display().to_string(),
            "role_structure": role_structure(&path),
            "summary": summary(&issues, output.return_code),
            "issues": issues,
            "profile_used": params.profile,
        }))
    }
}

pub struct AnalyzeProjectTool;

#[async_trait]
impl ToolDefinition for AnalyzeProjectTool {
    const NAME: &'static str = "analyze_project";
    const DESCRIPTION: &'static str = "Lint a whole Ansible project, group the issues by file \
         and list the files with the most issues.";
    type Params = AnalyzeProjectParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        check_profile(&params.profile)?;
        let path = validate_dir(&params.project_path, ctx.root_path())?;

        let mut args = base_args("json", &params.profile);
        args.push(path.to_string_lossy().into_owned());
        let output = ctx.lint().run_checked(&args).await?;
        let issues = parse_output(&output.stdout, "json");

        let by_file = group_by_file(&issues);
        let most_problematic = most_problematic(&by_file);

        Ok(json!({
            "project_path": path.display().to_string(),
            "project_structure": project_structure(&path),
            "summary": {
                "total_issues": issues.as_array().map_or(0, Vec::len),
                "files_with_issues": by_file.len(),
                "return_code": output.return_code,
            },
            "issues_by_file": by_file,
            "most_problematic_files": most_problematic,
            "profile_used": params.profile,
        }))
    }
}

/// `{dir: {exists, files}}` for each standard role directory.
fn role_structure(role: &Path) -> Value {
    let mut out = Map::new();
    for name in ROLE_DIRS {
        let dir = role.join(name);
        let entry = if dir.is_dir() {
            json!({ "exists": true, "files": sorted_entries(&dir) })
        } else {
            json!({ "exists": false, "files": [] })
        };
        out.insert((*name).to_string(), entry);
    }
    Value::Object(out)
}

/// Describe the well-known project entries that are present.
fn project_structure(project: &Path) -> Value {
    let mut out = Map::new();
    for name in PROJECT_ENTRIES {
        let entry = project.join(name);
        if entry.is_dir() {
            out.insert(
                (*name).to_string(),
                json!({ "type": "directory", "contents": sorted_entries(&entry) }),
            );
        } else if let Ok(meta) = fs::metadata(&entry) {
            out.insert(
                (*name).to_string(),
                json!({ "type": "file", "size": meta.len() }),
            );
        }
    }
    Value::Object(out)
}

fn sorted_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

fn group_by_file(issues: &Value) -> BTreeMap<String, Vec<Value>> {
    let mut grouped: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    for issue in issues.as_array().into_iter().flatten() {
        grouped.entry(issue_file(issue)).or_default().push(issue.clone());
    }
    grouped
}

/// Files ordered by issue count, ties broken by name.
fn most_problematic(grouped: &BTreeMap<String, Vec<Value>>) -> Vec<Value> {
    let mut counts: Vec<(&String, usize)> = grouped.iter().map(|(f, v)| (f, v.len())).collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    counts
        .into_iter()
        .take(MOST_PROBLEMATIC)
        .map(|(file, count)| json!({ "file": file, "issue_count": count }))
        .collect()
}
