// src/fetch/mod.rs
// =============================================================================
// This module retrieves page bodies.
//
// The crawler only talks to the Fetcher trait, so the network can be swapped
// for an in-memory stub in tests. The real implementation (HttpFetcher) uses
// one shared reqwest Client for every worker.
//
// Rust concepts:
// - Traits: Fetcher is an interface the crawler is generic over
// - async-trait: lets a trait declare async methods usable behind Arc<dyn ..>
// =============================================================================

mod http;

use async_trait::async_trait;
use url::Url;

use crate::address::Address;
use crate::error::Result;

pub use http::{HttpFetcher, DEFAULT_USER_AGENT};

/// A fetched page
#[derive(Debug, Clone)]
pub struct Page {
    /// Where the body actually came from, after redirects. Relative links
    /// resolve against this, not against the normalized address.
    pub url: Url,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GETs `address` and returns the final URL and the raw body bytes.
    ///
    /// Any failure (timeout, connection, non-2xx status, unreadable body) is
    /// reported as `CrawlError::Fetch`.
    async fn fetch(&self, address: &Address) -> Result<Page>;
}
