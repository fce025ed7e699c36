// src/address.rs
// =============================================================================
// Address normalization.
//
// Pages link to the same place in many different ways:
//   https://a.example/p
//   https://a.example/p/
//   https://a.example/p?ref=home
//   https://a.example/p#section
//   HTTPS://A.EXAMPLE:443/p//
// All of these should count as ONE address, otherwise the crawler wastes
// fetches and the dedup in the frontier is meaningless.
//
// normalize() turns a raw link into an Address:
// 1. Parse it as an absolute URL (the url crate lowercases the host and
//    drops default ports for us)
// 2. Reject anything that isn't http or https, or has no host
// 3. Strip the query string and the fragment
// 4. Strip any number of trailing '/' from the path
//
// normalize(normalize(x)) == normalize(x) for every valid x.
//
// Rust concepts:
// - Newtype pattern: Address wraps Url so it can only be built by normalize()
// - Trait impls (Display, Serialize) so Address prints and serializes as text
// =============================================================================

use serde::{Serialize, Serializer};
use std::fmt;
use url::Url;

use crate::error::{CrawlError, Result};

/// A canonical, comparable URL. Equality is exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(Url);

impl Address {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Host name, lowercased (e.g. "a.example")
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

// Normalizes a raw link into an Address
//
// Parameters:
//   raw: the link as it was found (must be absolute; relative links are
//        resolved by the extractor before they get here)
//
// Returns: Ok(Address) or Err(CrawlError::InvalidAddress)
//
// Example:
//   "https://a.example/p/?x=1#y" -> "https://a.example/p"
pub fn normalize(raw: &str) -> Result<Address> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| CrawlError::invalid_address(raw, e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(CrawlError::invalid_address(
            raw,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(CrawlError::invalid_address(raw, "missing host"));
    }

    url.set_query(None);
    url.set_fragment(None);

    // For http(s) an empty path serializes as "/", so the root keeps its slash
    let trimmed = url.path().trim_end_matches('/').to_string();
    url.set_path(&trimmed);

    Ok(Address(url))
}
