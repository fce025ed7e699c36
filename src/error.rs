// src/error.rs
// =============================================================================
// Error types shared by every part of the crawler.
//
// Only one kind of error is fatal: Configuration. It is raised before any
// crawling starts (bad seed, bad pattern, unwritable output).
//
// Everything else describes a single address that could not be used:
// - InvalidAddress: a link that does not normalize; it is dropped
// - Fetch: the network request failed; the address stays Visited
// - Extract: the page body could not be parsed for links
//
// Workers log and swallow these. They never stop the crawl.
//
// Output is raised after the crawl when the dump can't be written.
//
// Rust concepts:
// - thiserror: derives std::error::Error and Display from attributes
// - Enums with data: each variant carries the details of its failure
// =============================================================================

use thiserror::Error;

/// Why a fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The request did not finish within the configured timeout
    Timeout,
    /// Could not connect (DNS failure, refused, TLS handshake, ...)
    Connect,
    /// The server answered with a non-2xx status code
    Status(u16),
    /// The response body could not be read
    Body,
    /// Anything reqwest reports that doesn't fit above
    Other(String),
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchErrorKind::Timeout => write!(f, "request timed out"),
            FetchErrorKind::Connect => write!(f, "connection failed"),
            FetchErrorKind::Status(code) => write!(f, "HTTP {}", code),
            FetchErrorKind::Body => write!(f, "failed to read response body"),
            FetchErrorKind::Other(message) => write!(f, "{}", message),
        }
    }
}

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid address '{raw}': {reason}")]
    InvalidAddress { raw: String, reason: String },

    #[error("failed to fetch {address}: {kind}")]
    Fetch { address: String, kind: FetchErrorKind },

    #[error("failed to extract links from {address}: {reason}")]
    Extract { address: String, reason: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl CrawlError {
    pub fn invalid_address(raw: &str, reason: impl Into<String>) -> Self {
        CrawlError::InvalidAddress {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        CrawlError::Configuration(message.into())
    }

    /// True only for errors that should stop the program
    #[cfg(test)]
    pub fn is_fatal(&self) -> bool {
        matches!(self, CrawlError::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, CrawlError>;
