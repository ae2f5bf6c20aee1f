//! Test helpers: in-process mock upstreams and result inspection.

use std::sync::Arc;

use axum::Router;
use rmcp::model::{CallToolResult, JsonObject};
use serde_json::Value;
use tokio::net::TcpListener;

use crate::core::config::Config;
use crate::domains::tools::context::ToolContext;

/// Serve `app` on an ephemeral local port and return `http://addr`.
pub async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move { axum::serve(listener, app).await });
    format!("http://{addr}")
}

/// Context built from a default config adjusted by `f`.
pub fn context(f: impl FnOnce(&mut Config)) -> ToolContext {
    let mut config = Config::default();
    f(&mut config);
    ToolContext::new(Arc::new(config))
}

/// Arguments object from a `json!` literal.
pub fn args(value: Value) -> JsonObject {
    match value {
        Value::Object(map) => map,
        other => panic!("arguments must be an object, got {other}"),
    }
}

/// First text block of a tool result.
pub fn text(result: &CallToolResult) -> String {
    result
        .content
        .first()
        .and_then(|c| c.as_text())
        .map(|t| t.text.clone())
        .unwrap_or_default()
}

/// Structured content of a successful result.
pub fn structured(result: &CallToolResult) -> Value {
    assert_eq!(result.is_error, Some(false), "tool failed: {}", text(result));
    result.structured_content.clone().expect("structured content")
}

/// Assert the result is an error and return its text.
pub fn error_text(result: &CallToolResult) -> String {
    assert_eq!(result.is_error, Some(true), "expected an error result");
    let text = text(result);
    assert!(text.starts_with("Error:"), "unexpected error text: {text}");
    text
}
