// src/extract/mod.rs
// =============================================================================
// This module finds outbound links in a fetched page.
//
// Submodules:
// - pattern: a regular expression over the raw bytes, only absolute
//            http/https href values (fast, tolerant of broken markup)
// - html: a real HTML parse with CSS selectors, relative links resolved
//         against the URL the page was served from
//
// Both strategies return raw link strings. Normalizing and filtering them
// is the crawler's job, not the extractor's.
// =============================================================================

mod html;
mod pattern;

use clap::ValueEnum;
use url::Url;

use crate::error::Result;

pub use html::HtmlExtractor;
pub use pattern::PatternExtractor;

/// Which extraction strategy to use (selected with --extractor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExtractorKind {
    /// Regex over the raw body, absolute links only
    #[default]
    Pattern,
    /// Parse the HTML and read a[href] / link[href]
    Html,
}

#[derive(Debug, Clone)]
pub enum LinkExtractor {
    Pattern(PatternExtractor),
    Html(HtmlExtractor),
}

impl LinkExtractor {
    pub fn new(kind: ExtractorKind) -> Result<Self> {
        Ok(match kind {
            ExtractorKind::Pattern => LinkExtractor::Pattern(PatternExtractor::new()?),
            ExtractorKind::Html => LinkExtractor::Html(HtmlExtractor::new()?),
        })
    }

    // Extracts raw links from a page body
    //
    // Parameters:
    //   body: the bytes returned by the fetcher
    //   base: the final URL the body was served from (after redirects)
    //
    // Returns: the links in document order (may contain duplicates)
    pub fn extract(&self, body: &[u8], base: &Url) -> Result<Vec<String>> {
        match self {
            LinkExtractor::Pattern(extractor) => Ok(extractor.extract(body)),
            LinkExtractor::Html(extractor) => extractor.extract(body, base),
        }
    }
}
