// src/extract/pattern.rs
// =============================================================================
// Regex-based link extraction.
//
// Looks for href="http(s)://host..." (single or double quotes) directly in
// the raw bytes. No HTML parsing happens, so this works on broken markup,
// non-UTF-8 pages, and anything else that happens to contain href attributes.
//
// Relative links are NOT found in this mode.
// =============================================================================

use regex::bytes::Regex;

use crate::error::{CrawlError, Result};

const HREF_PATTERN: &str = r#"href=["'](https?://[a-zA-Z0-9.\-]+[^"']*)["']"#;

#[derive(Debug, Clone)]
pub struct PatternExtractor {
    regex: Regex,
}

impl PatternExtractor {
    pub fn new() -> Result<Self> {
        let regex = Regex::new(HREF_PATTERN)
            .map_err(|e| CrawlError::config(format!("invalid link pattern: {}", e)))?;
        Ok(Self { regex })
    }

    pub fn extract(&self, body: &[u8]) -> Vec<String> {
        self.regex
            .captures_iter(body)
            .filter_map(|captures| captures.get(1))
            .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
            .collect()
    }
}
