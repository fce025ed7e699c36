// src/filter.rs
// =============================================================================
// Host restriction.
//
// After a link is normalized, the crawler decides whether it is allowed to
// enter the frontier at all. There are three modes:
// - Unrestricted: every address is accepted
// - ExactHost: only addresses whose host equals the given name
// - HostPattern: only addresses whose host matches a regular expression
//
// The filter runs BEFORE Frontier::add, so rejected links never count
// towards the capacity.
// =============================================================================

use regex::Regex;

use crate::address::Address;
use crate::error::{CrawlError, Result};

#[derive(Debug, Clone, Default)]
pub enum HostFilter {
    #[default]
    Unrestricted,
    ExactHost(String),
    HostPattern(Regex),
}

impl HostFilter {
    /// Builds an exact-host filter. Hosts compare lowercased.
    pub fn exact(host: &str) -> Result<Self> {
        let host = host.trim().to_ascii_lowercase();
        if host.is_empty() {
            return Err(CrawlError::config("host restriction must not be empty"));
        }
        Ok(HostFilter::ExactHost(host))
    }

    /// Compiles a host pattern, e.g. `^(www\.)?a\.example$`
    pub fn pattern(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            CrawlError::config(format!("invalid host pattern '{}': {}", pattern, e))
        })?;
        Ok(HostFilter::HostPattern(regex))
    }

    pub fn allows(&self, address: &Address) -> bool {
        let host = match address.host() {
            Some(host) => host,
            None => return false,
        };

        match self {
            HostFilter::Unrestricted => true,
            HostFilter::ExactHost(expected) => host == expected,
            HostFilter::HostPattern(regex) => regex.is_match(host),
        }
    }
}
