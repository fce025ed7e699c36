// src/extract/html.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// We also use the `url` crate to:
// - Resolve relative URLs to absolute URLs against the page URL
//
// The base must be the URL the page was really served from. A normalized
// address has lost its trailing slash, so "intro" on /docs/ would resolve
// to /intro instead of /docs/intro.
//
// Both <a href> and <link href> are followed, so stylesheets, feeds and
// canonical links are discovered as well as ordinary anchors.
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

use crate::error::{CrawlError, Result};

const LINKS_QUERY: &str = "a[href], link[href]";

#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    selector: Selector,
}

impl HtmlExtractor {
    pub fn new() -> Result<Self> {
        let selector = Selector::parse(LINKS_QUERY)
            .map_err(|e| CrawlError::config(format!("invalid link selector: {:?}", e)))?;
        Ok(Self { selector })
    }

    // Extracts all links from HTML content
    //
    // Parameters:
    //   body: the HTML content to parse (must be UTF-8)
    //   base: the URL of the page (for resolving relative links)
    //
    // Returns: Vec<String> containing all absolute http/https URLs found
    //
    // Example:
    //   body = "<a href='/docs'>Docs</a>"
    //   base = "https://example.com"
    //   result = ["https://example.com/docs"]
    pub fn extract(&self, body: &[u8], base: &Url) -> Result<Vec<String>> {
        let html = std::str::from_utf8(body).map_err(|e| CrawlError::Extract {
            address: base.to_string(),
            reason: format!("body is not valid UTF-8: {}", e),
        })?;

        let document = Html::parse_document(html);

        let links = document
            .select(&self.selector)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| resolve_url(base, href))
            .filter(|url| is_http_link(url))
            .collect();

        Ok(links)
    }
}

// Resolves a possibly-relative URL to an absolute URL
//
// Examples:
//   base = "https://example.com/page"
//   href = "/docs" -> Some("https://example.com/docs")
//   href = "../other" -> Some("https://example.com/other")
//   href = "https://other.com" -> Some("https://other.com/")
//   href = "#top" -> None
fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    // join() handles both cases: an absolute href replaces the base,
    // a relative one is resolved against it
    base.join(href).ok().map(|url| url.to_string())
}

// We skip mailto:, tel:, javascript:, data: and file: links
fn is_http_link(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
