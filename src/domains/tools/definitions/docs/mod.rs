//! Red Hat documentation toolset.
//!
//! Product and version discovery comes from the site's sitemaps and is
//! re-read on every call. Guide URLs are built from the well-known
//! `/en/documentation/{product}/{version}/html/{guide}/index` layout.

mod catalog;
mod guidance;
mod read;
pub mod sitemap;

pub use catalog::{GetProductGuidesTool, ListProductsTool, SearchDocumentationTool};
pub use guidance::{
    RecommendContentTool, SearchDocumentationEnhancedTool, SearchWithWebGuidanceTool,
    SmartDocumentationFinderTool,
};
pub use read::{CheckDomainTool, ReadDocumentationTool};

toolset!(
    CheckDomainTool,
    ReadDocumentationTool,
    ListProductsTool,
    SearchDocumentationTool,
    GetProductGuidesTool,
    RecommendContentTool,
    SearchWithWebGuidanceTool,
    SearchDocumentationEnhancedTool,
    SmartDocumentationFinderTool,
);
