//! Tool-specific error types.
//!
//! Every variant is rendered into an error-shaped `CallToolResult` at the
//! tool boundary, so the `Display` text is what the caller sees.

use thiserror::Error;

/// Maximum number of upstream body characters kept in an error message.
pub const ERROR_BODY_LIMIT: usize = 200;

/// Errors that can occur during tool operations.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A required environment variable or upstream is missing.
    #[error("{0} is not configured")]
    NotConfigured(String),

    /// Tool was called with invalid arguments.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The request never produced a response (connect, TLS, DNS).
    #[error("Request failed: {0}")]
    Transport(String),

    /// The upstream answered with a non-2xx status.
    #[error("HTTP Error {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The upstream response did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// The linter could not be run or exited abnormally.
    #[error("ansible-lint failed: {0}")]
    Subprocess(String),

    /// The linter did not finish in time.
    #[error("Command timed out after {0} seconds")]
    Timeout(u64),

    /// Local filesystem problem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tool with the given name was not found.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Internal error within the tool.
    #[error("Internal tool error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a "not configured" error naming the missing settings.
    pub fn not_configured(what: impl Into<String>) -> Self {
        Self::NotConfigured(what.into())
    }

    /// Create an invalid arguments error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create an upstream error, truncating the body.
    pub fn upstream(status: u16, body: impl AsRef<str>) -> Self {
        Self::Upstream {
            status,
            body: truncate_chars(body.as_ref(), ERROR_BODY_LIMIT),
        }
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a subprocess error.
    pub fn subprocess(msg: impl Into<String>) -> Self {
        Self::Subprocess(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<crate::core::security::PathSecurityError> for ToolError {
    fn from(err: crate::core::security::PathSecurityError) -> Self {
        Self::InvalidArguments(err.to_string())
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Cut a string to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
