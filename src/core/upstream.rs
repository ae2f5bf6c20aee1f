//! Scoped HTTP client for the REST upstreams.
//!
//! One `UpstreamClient` is built per upstream at start with a base URL and an
//! auth mode, then shared read-only by every tool call. Certificate
//! verification is disabled: the platforms this talks to are usually lab
//! installs with self-signed certificates.

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::debug;
use url::Url;

use crate::domains::tools::ToolError;

/// How requests are authenticated.
#[derive(Clone, Default)]
pub enum Auth {
    #[default]
    None,
    Bearer(String),
    /// `Authorization: Token <key>`, used by Galaxy.
    Token(String),
    Basic { username: String, password: String },
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::None => write!(f, "None"),
            Auth::Bearer(_) => write!(f, "Bearer([REDACTED])"),
            Auth::Token(_) => write!(f, "Token([REDACTED])"),
            Auth::Basic { username, .. } => write!(f, "Basic({username}, [REDACTED])"),
        }
    }
}

impl Auth {
    /// Bearer auth when a token is present, none otherwise.
    pub fn bearer(token: Option<&str>) -> Self {
        match token {
            Some(t) => Auth::Bearer(t.to_string()),
            None => Auth::None,
        }
    }

    fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Auth::None => request,
            Auth::Bearer(token) => request.bearer_auth(token),
            Auth::Token(token) => {
                request.header(reqwest::header::AUTHORIZATION, format!("Token {token}"))
            }
            Auth::Basic { username, password } => request.basic_auth(username, Some(password)),
        }
    }
}

/// HTTP client bound to one upstream API root.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    base: Url,
    auth: Auth,
}

impl UpstreamClient {
    /// Build a client for `base_url`.
    pub fn new(base_url: &str, auth: Auth) -> Result<Self, ToolError> {
        let mut base = Url::parse(base_url.trim())
            .map_err(|e| ToolError::invalid_arguments(format!("bad base URL '{base_url}': {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = Client::builder()
            .danger_accept_invalid_certs(true)
            .user_agent(concat!("ansible-mcp-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ToolError::internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base, auth })
    }

    /// The API root every relative path is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve a request path against the base URL.
    ///
    /// Absolute `http(s)://` URLs are used unchanged, `/api/...` paths are
    /// resolved against the origin and anything else is appended to the base.
    pub fn resolve(&self, path: &str) -> Result<Url, ToolError> {
        let result = if path.starts_with("http://") || path.starts_with("https://") {
            Url::parse(path)
        } else if path.starts_with("/api/") {
            self.base.join(path)
        } else {
            self.base.join(path.trim_start_matches('/'))
        };
        result.map_err(|e| ToolError::invalid_arguments(format!("bad request path '{path}': {e}")))
    }

    /// Issue one request and return the status with the decoded body.
    ///
    /// The body is JSON when it parses as JSON, a string otherwise and null
    /// when empty. Non-2xx statuses are returned, not turned into errors.
    pub async fn send<Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<(StatusCode, Value), ToolError>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let mut url = self.resolve(path)?;
        if let Some(query) = query {
            let encoded = serde_urlencoded::to_string(query)
                .map_err(|e| ToolError::invalid_arguments(format!("bad query: {e}")))?;
            if !encoded.is_empty() {
                let merged = match url.query() {
                    Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
                    _ => encoded,
                };
                url.set_query(Some(&merged));
            }
        }

        debug!(method = %method, url = %url, "upstream request");

        let mut request = self.auth.apply(self.http.request(method, url));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), bytes = text.len(), "upstream response");

        Ok((status, decode_body(&text)))
    }

    /// GET a document without decoding it.
    ///
    /// Used for pages, sitemaps and PDFs where the content type matters.
    pub async fn fetch(&self, path: &str) -> Result<RawResponse, ToolError> {
        let url = self.resolve(path)?;
        debug!(url = %url, "upstream fetch");

        let response = self.auth.apply(self.http.get(url)).send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }

    async fn expect_success<Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<Value, ToolError>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let (status, value) = self.send(method, path, query, body).await?;
        if status.is_success() {
            Ok(value)
        } else {
            Err(ToolError::upstream(status.as_u16(), body_text(&value)))
        }
    }

    /// GET, failing on non-2xx.
    pub async fn get<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: Option<&Q>,
    ) -> Result<Value, ToolError> {
        self.expect_success::<Q, Value>(Method::GET, path, query, None)
            .await
    }

    /// POST a JSON body, failing on non-2xx.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, ToolError> {
        self.expect_success::<(), B>(Method::POST, path, None, body)
            .await
    }

    /// PATCH a JSON body, failing on non-2xx.
    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, ToolError> {
        self.expect_success::<(), B>(Method::PATCH, path, None, Some(body))
            .await
    }

    /// DELETE, failing on non-2xx.
    pub async fn delete(&self, path: &str) -> Result<Value, ToolError> {
        self.expect_success::<(), Value>(Method::DELETE, path, None, None)
            .await
    }

    /// Fetch a paginated collection and flatten it to `{count, results}`.
    ///
    /// Follows `next` at most once while fewer than `limit` records are in
    /// hand. `count` is the upstream total when reported.
    pub async fn get_page<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: Option<&Q>,
        limit: usize,
    ) -> Result<Value, ToolError> {
        let first = self.get(path, query).await?;
        let (count, mut results, next) = split_page(first)?;

        if results.len() < limit {
            if let Some(next) = next {
                let second = self.get::<()>(&next, None).await?;
                let (_, more, _) = split_page(second)?;
                results.extend(more);
            }
        }

        results.truncate(limit);
        let count = count.unwrap_or(results.len() as u64);
        Ok(json!({ "count": count, "results": results }))
    }
}

/// Undecoded response returned by [`UpstreamClient::fetch`].
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Turn a non-2xx response into an upstream error.
    pub fn error_for_status(self) -> Result<Self, ToolError> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(ToolError::upstream(self.status.as_u16(), self.text()))
        }
    }
}

fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn body_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Split a page into (count, results, next). Bare arrays are accepted.
fn split_page(page: Value) -> Result<(Option<u64>, Vec<Value>, Option<String>), ToolError> {
    match page {
        Value::Array(items) => Ok((None, items, None)),
        Value::Object(mut map) => {
            let results = match map.remove("results").or_else(|| map.remove("data")) {
                Some(Value::Array(items)) => items,
                Some(Value::Null) | None => Vec::new(),
                Some(other) => {
                    return Err(ToolError::decode(format!(
                        "expected a results array, got {other}"
                    )));
                }
            };
            let count = map.get("count").and_then(Value::as_u64).or_else(|| {
                map.get("meta")
                    .and_then(|m| m.get("count"))
                    .and_then(Value::as_u64)
            });
            let next = next_link(&map);
            Ok((count, results, next))
        }
        other => Err(ToolError::decode(format!("expected a page object, got {other}"))),
    }
}

fn next_link(map: &Map<String, Value>) -> Option<String> {
    map.get("next")
        .or_else(|| map.get("links").and_then(|l| l.get("next")))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
