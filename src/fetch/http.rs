// src/fetch/http.rs
// =============================================================================
// This module fetches pages over HTTP with reqwest.
//
// Key functionality:
// - Makes HTTP GET requests with a per-request timeout
// - Treats any non-2xx status as a failure (no links are taken from error
//   pages)
// - Sorts reqwest errors into a small set of kinds for logging
//
// One Client is built at startup and shared by every worker. reqwest's Client
// is internally reference counted and pools connections, so workers use it
// concurrently without any extra locking.
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{Fetcher, Page};
use crate::address::Address;
use crate::error::{CrawlError, FetchErrorKind, Result};

pub const DEFAULT_USER_AGENT: &str = concat!("link-harvester/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    // Builds the shared HTTP client
    //
    // Parameters:
    //   timeout: applied to every request (connect + headers + body)
    //   user_agent: sent with every request
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| CrawlError::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, address: &Address) -> Result<Page> {
        let response = self
            .client
            .get(address.as_str())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| fetch_error(address, categorize_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(address, FetchErrorKind::Status(status.as_u16())));
        }

        // The address is normalized (no trailing slash) and may have been
        // redirected, so the response URL is the base for relative links
        let url = response.url().clone();

        let body = response.bytes().await.map_err(|e| {
            let kind = if e.is_timeout() {
                FetchErrorKind::Timeout
            } else {
                FetchErrorKind::Body
            };
            fetch_error(address, kind)
        })?;

        Ok(Page {
            url,
            body: body.to_vec(),
        })
    }
}

fn fetch_error(address: &Address, kind: FetchErrorKind) -> CrawlError {
    CrawlError::Fetch {
        address: address.to_string(),
        kind,
    }
}

// Categorizes different error types from reqwest
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure or refused connection
// - SSL certificate issues
// - Too many redirects
fn categorize_error(error: &reqwest::Error) -> FetchErrorKind {
    if error.is_timeout() {
        FetchErrorKind::Timeout
    } else if error.is_connect() {
        FetchErrorKind::Connect
    } else if error.is_redirect() {
        FetchErrorKind::Other("too many redirects".to_string())
    } else {
        FetchErrorKind::Other(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::normalize;
    use httpmock::{Method::GET, MockServer};

    fn fetcher(timeout_ms: u64) -> HttpFetcher {
        HttpFetcher::new(Duration::from_millis(timeout_ms), DEFAULT_USER_AGENT).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/page");
                then.status(200).body("<a href=\"https://a.example/\">a</a>");
            })
            .await;

        let address = normalize(&server.url("/page")).unwrap();
        let page = fetcher(2000).fetch(&address).await.unwrap();

        assert_eq!(page.body, b"<a href=\"https://a.example/\">a</a>".to_vec());
        assert_eq!(page.url.as_str(), server.url("/page"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_reports_url_after_redirect() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/docs");
                then.status(301).header("Location", server.url("/docs/"));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/docs/");
                then.status(200).body("<a href=\"intro\">intro</a>");
            })
            .await;

        let address = normalize(&server.url("/docs/")).unwrap();
        assert_eq!(address.as_str(), server.url("/docs"));

        let page = fetcher(2000).fetch(&address).await.unwrap();
        assert_eq!(page.url.as_str(), server.url("/docs/"));
        assert_eq!(page.body, b"<a href=\"intro\">intro</a>".to_vec());
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404).body("not here");
            })
            .await;

        let address = normalize(&server.url("/missing")).unwrap();
        let err = fetcher(2000).fetch(&address).await.unwrap_err();

        match err {
            CrawlError::Fetch { kind, .. } => assert_eq!(kind, FetchErrorKind::Status(404)),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/slow");
                then.status(200).delay(Duration::from_millis(1500)).body("late");
            })
            .await;

        let address = normalize(&server.url("/slow")).unwrap();
        let err = fetcher(100).fetch(&address).await.unwrap_err();

        match err {
            CrawlError::Fetch { kind, .. } => assert_eq!(kind, FetchErrorKind::Timeout),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Port 1 is reserved and nothing listens on it
        let address = normalize("http://127.0.0.1:1/").unwrap();
        let err = fetcher(2000).fetch(&address).await.unwrap_err();
        assert!(matches!(err, CrawlError::Fetch { .. }));
    }
}
