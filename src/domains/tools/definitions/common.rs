//! Helpers shared by every toolset.

use rmcp::model::{CallToolResult, Content};
use serde_json::{Map, Value};
use tracing::warn;

use crate::domains::tools::ToolError;

/// Default page size for list tools.
pub fn default_page_size() -> usize {
    25
}

/// Default limit for search tools.
pub fn default_limit() -> usize {
    10
}

/// Clamp a caller-supplied page size or limit to 1..=100.
pub fn validate_limit(limit: usize) -> usize {
    limit.clamp(1, 100)
}

/// Success result carrying the value as pretty JSON text and, for objects,
/// as structured content.
pub fn success_result(value: Value) -> CallToolResult {
    let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
    let structured = value.is_object().then_some(value);
    CallToolResult {
        content: vec![Content::text(text)],
        structured_content: structured,
        is_error: Some(false),
        meta: None,
    }
}

/// Error result with text `Error: {e}`.
pub fn error_result(tool: &str, error: &ToolError) -> CallToolResult {
    warn!(tool, "{}", error);
    CallToolResult::error(vec![Content::text(format!("Error: {error}"))])
}

/// Copy the listed keys out of an upstream record. Missing keys become null.
pub fn pick_fields(record: &Value, fields: &[&str]) -> Value {
    let mut out = Map::with_capacity(fields.len());
    for field in fields {
        out.insert(
            (*field).to_string(),
            record.get(*field).cloned().unwrap_or(Value::Null),
        );
    }
    Value::Object(out)
}

/// Apply [`pick_fields`] to every record of a `{count, results}` page.
pub fn pick_page(mut page: Value, fields: &[&str]) -> Value {
    if let Some(Value::Array(results)) = page.get_mut("results") {
        for record in results.iter_mut() {
            *record = pick_fields(record, fields);
        }
    }
    page
}

/// Reject a value outside a fixed set of choices.
pub fn one_of(name: &str, value: &str, allowed: &[&str]) -> Result<(), ToolError> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(ToolError::invalid_arguments(format!(
        "{name} must be one of {}, got '{value}'",
        allowed.join(", ")
    )))
}

/// Reject an empty (or whitespace-only) string argument.
pub fn require_non_empty(name: &str, value: &str) -> Result<(), ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::invalid_arguments(format!("'{name}' must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_limit() {
        assert_eq!(validate_limit(0), 1);
        assert_eq!(validate_limit(25), 25);
        assert_eq!(validate_limit(500), 100);
    }

    #[test]
    fn test_pick_fields_fills_missing_with_null() {
        let record = json!({"id": 1, "name": "web", "secret": "x"});
        let picked = pick_fields(&record, &["id", "name", "kind"]);
        assert_eq!(picked, json!({"id": 1, "name": "web", "kind": null}));
    }

    #[test]
    fn test_pick_page() {
        let page = json!({"count": 2, "results": [{"id": 1, "x": 0}, {"id": 2}]});
        let picked = pick_page(page, &["id"]);
        assert_eq!(picked, json!({"count": 2, "results": [{"id": 1}, {"id": 2}]}));
    }

    #[test]
    fn test_success_result_structured_only_for_objects() {
        let result = success_result(json!({"ok": true}));
        assert_eq!(result.is_error, Some(false));
        assert_eq!(result.structured_content, Some(json!({"ok": true})));

        let result = success_result(json!([1, 2]));
        assert!(result.structured_content.is_none());
    }

    #[test]
    fn test_error_result_text() {
        let result = error_result("t", &ToolError::upstream(401, "denied"));
        assert_eq!(result.is_error, Some(true));
        let text = result.content[0].as_text().map(|t| t.text.clone()).unwrap();
        assert_eq!(text, "Error: HTTP Error 401: denied");
    }

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("name", "web").is_ok());
        assert!(require_non_empty("name", "  ").is_err());
    }

    #[test]
    fn test_one_of_names_choices() {
        assert!(one_of("mode", "pdf", &["pdf", "html"]).is_ok());
        let err = one_of("mode", "doc", &["pdf", "html"]).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
        assert!(err.to_string().contains("mode must be one of pdf, html, got 'doc'"));
    }
}
