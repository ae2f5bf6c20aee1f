//! Domain checks and document fetching.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::sitemap::pdf_url;
use crate::domains::tools::ToolError;
use crate::domains::tools::context::ToolContext;
use crate::domains::tools::definitions::ToolDefinition;
use crate::domains::tools::definitions::common::one_of;
use crate::domains::tools::error::truncate_chars;

const FORMAT_PREFERENCES: &[&str] = &["auto", "pdf", "html"];

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CheckDomainParams {
    #[schemars(description = "URL to check against the official domain list")]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReadDocumentationParams {
    #[schemars(description = "Documentation URL on an official Red Hat domain")]
    pub url: String,

    #[schemars(description = "auto (PDF first, then HTML), pdf or html")]
    #[serde(default = "default_format_preference")]
    pub format_preference: String,

    #[schemars(description = "Maximum characters of page text to return (default: 20000)")]
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

fn default_format_preference() -> String {
    "auto".to_string()
}

fn default_max_chars() -> usize {
    20_000
}

pub struct CheckDomainTool;

#[async_trait]
impl ToolDefinition for CheckDomainTool {
    const NAME: &'static str = "check_domain";
    const DESCRIPTION: &'static str =
        "Check whether a URL belongs to an official Red Hat domain.";
    type Params = CheckDomainParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        let policy = ctx.domains();
        let host = policy.host_of(&params.url);
        let allowed = host.as_deref().is_some_and(|h| policy.is_host_allowed(h));
        Ok(json!({
            "url": params.url,
            "host": host,
            "allowed": allowed,
        }))
    }
}

pub struct ReadDocumentationTool;

#[async_trait]
impl ToolDefinition for ReadDocumentationTool {
    const NAME: &'static str = "read_documentation";
    const DESCRIPTION: &'static str = "Read Red Hat documentation from a URL. With format \
         auto or pdf the PDF version of an HTML guide is tried first; HTML pages are returned \
         as plain text.";
    type Params = ReadDocumentationParams;

    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<Value, ToolError> {
        let preference = params.format_preference.as_str();
        one_of("format_preference", preference, FORMAT_PREFERENCES)?;
        if params.max_chars == 0 {
            return Err(ToolError::invalid_arguments("max_chars must be at least 1"));
        }
        if !ctx.domains().is_allowed(&params.url) {
            return Err(ToolError::invalid_arguments(format!(
                "URL must be on an official Red Hat domain: {}",
                params.url
            )));
        }

        let client = ctx.docs()?;

        if matches!(preference, "auto" | "pdf") && params.url.contains("/html") {
            if let Some(pdf) = pdf_url(&params.url) {
                match client.fetch(&pdf).await {
                    Ok(response)
                        if response.status.is_success()
                            && response.content_type.to_lowercase().contains("pdf") =>
                    {
                        return Ok(json!({
                            "url": params.url,
                            "pdf_url": pdf,
                            "format": "pdf",
                            "content_type": response.content_type,
                            "size_bytes": response.body.len(),
                            "note": "PDF text extraction is not performed; download the PDF to read it.",
                        }));
                    }
                    Ok(response) => debug!(
                        status = response.status.as_u16(),
                        content_type = %response.content_type,
                        "No PDF twin, falling back"
                    ),
                    Err(e) => debug!("PDF twin fetch failed: {}", e),
                }
            }
        }

        if preference == "pdf" {
            return Err(ToolError::decode(format!(
                "no PDF version available for {}",
                params.url
            )));
        }

        let response = client.fetch(&params.url).await?.error_for_status()?;
        let text = html_to_text(&response.text());
        let total_chars = text.chars().count();
        let truncated = total_chars > params.max_chars;

        Ok(json!({
            "url": params.url,
            "format": "html",
            "content_type": response.content_type,
            "total_chars": total_chars,
            "truncated": truncated,
            "content": truncate_chars(&text, params.max_chars),
        }))
    }
}

/// Plain text of an HTML page: script and style bodies dropped, tags
/// removed, common entities decoded and whitespace collapsed.
pub fn html_to_text(html: &str) -> String {
    // ASCII lowercasing keeps byte offsets identical.
    let lower = html.to_ascii_lowercase();
    let mut out = String::with_capacity(html.len() / 2);
    let mut i = 0;

    while i < html.len() {
        let rest = &lower[i..];
        let skip_block = ["script", "style"]
            .into_iter()
            .find(|tag| rest.starts_with(&format!("<{tag}")));
        if let Some(tag) = skip_block {
            let close = format!("</{tag}>");
            match rest.find(&close) {
                Some(end) => {
                    i += end + close.len();
                    out.push(' ');
                    continue;
                }
                None => break,
            }
        }
        if rest.starts_with('<') {
            match rest.find('>') {
                Some(end) => {
                    i += end + 1;
                    out.push(' ');
                    continue;
                }
                None => break,
            }
        }
        match html[i..].chars().next() {
            Some(ch) => {
                out.push(ch);
                i += ch.len_utf8();
            }
            None => break,
        }
    }

    let decoded = out
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::docs::mock::{docs_context, site};
    use crate::domains::tools::definitions::invoke;
    use crate::domains::tools::definitions::testing::{args, context, error_text, structured};

    #[test]
    fn test_html_to_text() {
        let html = "<html><head><STYLE>p{}</STYLE><script type=\"x\">if (a < b) {}</script></head>\
                    <body><p>Hello&nbsp;<i>world</i></p>\n\n<p>a &amp; b</p></body></html>";
        assert_eq!(html_to_text(html), "Hello world a & b");
        assert_eq!(html_to_text("plain   text"), "plain text");
        assert_eq!(html_to_text("héllo <b>wörld</b>"), "héllo wörld");
    }

    #[tokio::test]
    async fn test_check_domain() {
        let ctx = context(|_| {});
        let result = invoke::<CheckDomainTool>(
            &ctx,
            args(json!({"url": "https://www.Docs.RedHat.com/en/documentation"})),
        )
        .await;
        let value = structured(&result);
        assert_eq!(value["host"], "docs.redhat.com");
        assert_eq!(value["allowed"], true);

        let result = invoke::<CheckDomainTool>(
            &ctx,
            args(json!({"url": "https://redhat.com.evil.example/x"})),
        )
        .await;
        assert_eq!(structured(&result)["allowed"], false);

        let result = invoke::<CheckDomainTool>(&ctx, args(json!({"url": "not a url"}))).await;
        let value = structured(&result);
        assert_eq!(value["allowed"], false);
        assert!(value["host"].is_null());
    }

    #[tokio::test]
    async fn test_read_rejects_foreign_domain() {
        let ctx = context(|_| {});
        let result = invoke::<ReadDocumentationTool>(
            &ctx,
            args(json!({"url": "https://example.com/html/guide/index"})),
        )
        .await;
        assert!(error_text(&result).contains("official Red Hat domain"));
    }

    #[tokio::test]
    async fn test_read_prefers_pdf_twin() {
        let base = site().await;
        let ctx = docs_context(&base);
        let url = format!("{base}/docs/ocp/html/updating_clusters/index");

        let result = invoke::<ReadDocumentationTool>(&ctx, args(json!({"url": url}))).await;
        let value = structured(&result);
        assert_eq!(value["format"], "pdf");
        assert_eq!(value["pdf_url"], format!("{base}/docs/ocp/pdf/updating_clusters/index"));
        assert_eq!(value["content_type"], "application/pdf");
        assert_eq!(value["size_bytes"], 13);
    }

    #[tokio::test]
    async fn test_read_falls_back_to_html_text() {
        let base = site().await;
        let ctx = docs_context(&base);
        let url = format!("{base}/docs/rhel/html/security_hardening/index");

        let result = invoke::<ReadDocumentationTool>(&ctx, args(json!({"url": url}))).await;
        let value = structured(&result);
        assert_eq!(value["format"], "html");
        assert_eq!(value["content"], "Updating clusters Use the web console & CLI.");
        assert_eq!(value["truncated"], false);

        let result = invoke::<ReadDocumentationTool>(
            &ctx,
            args(json!({"url": url, "format_preference": "html", "max_chars": 8})),
        )
        .await;
        let value = structured(&result);
        assert_eq!(value["content"], "Updating");
        assert_eq!(value["truncated"], true);
    }

    #[tokio::test]
    async fn test_read_pdf_only_without_pdf_fails() {
        let base = site().await;
        let ctx = docs_context(&base);
        let url = format!("{base}/docs/rhel/html/security_hardening/index");

        let result = invoke::<ReadDocumentationTool>(
            &ctx,
            args(json!({"url": url, "format_preference": "pdf"})),
        )
        .await;
        assert!(error_text(&result).contains("no PDF version"));
    }

    #[tokio::test]
    async fn test_read_surfaces_http_errors() {
        let base = site().await;
        let ctx = docs_context(&base);
        let url = format!("{base}/docs/missing");

        let result = invoke::<ReadDocumentationTool>(&ctx, args(json!({"url": url}))).await;
        assert!(error_text(&result).contains("HTTP Error 404"));
    }
}
