//! HTTP client wrapper for fetching pages as raw bytes.
//!
//! This module provides the `HttpClient` struct which fetches crawl targets
//! with a browser-like identity, a bounded request budget and a bounded body
//! size. Certificate validation is disabled for page fetches: freshly issued
//! sites are frequently misconfigured and the content is treated as untrusted
//! anyway.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use super::PageFetcher;
use super::constants::{CONNECT_TIMEOUT_SECS, MAX_PAGE_BYTES, PAGE_TIMEOUT_SECS};
use super::error::FetchError;
use crate::user_agent;

/// HTTP client for crawl-target pages.
///
/// Created once per orchestrator and shared by every worker task, taking
/// advantage of connection pooling.
///
/// # Example
///
/// ```no_run
/// use quote_radar_core::fetch::HttpClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new()?;
/// let body = client.fetch_page("https://example.com").await?;
/// println!("fetched {} bytes", body.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    max_body_bytes: usize,
}

impl HttpClient {
    /// Creates a page client with the default 15 second budget.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(PAGE_TIMEOUT_SECS)
    }

    /// Creates a page client with an explicit total request budget.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the TLS backend cannot be initialized.
    #[instrument(level = "debug")]
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, FetchError> {
        let client = build_client(
            user_agent::BROWSER_USER_AGENT,
            Duration::from_secs(timeout_secs),
            true,
        )
        .map_err(FetchError::ClientBuild)?;
        Ok(Self {
            client,
            max_body_bytes: MAX_PAGE_BYTES,
        })
    }

    /// Overrides the maximum number of body bytes kept per page.
    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Fetches `url` and returns its body, regardless of declared content type.
    ///
    /// Bodies larger than the configured limit are truncated, not rejected.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if:
    /// - The URL is invalid
    /// - The request fails (network error, timeout)
    /// - The server returns a non-success status
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_page(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url, status.as_u16()));
        }

        let (body, truncated) = read_bounded(response, url, self.max_body_bytes).await?;
        if truncated {
            debug!(limit = self.max_body_bytes, "page body truncated");
        }
        debug!(bytes = body.len(), "page fetched");
        Ok(body)
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.fetch_page(url).await
    }
}

/// Streams the response body into memory, keeping at most `limit` bytes.
///
/// The flag is `true` when the body was longer than `limit` and got cut.
pub(crate) async fn read_bounded(
    response: reqwest::Response,
    url: &str,
    limit: usize,
) -> Result<(Vec<u8>, bool), FetchError> {
    let mut stream = response.bytes_stream();
    let mut body = Vec::new();

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| FetchError::from_reqwest(url, e))?;
        let remaining = limit.saturating_sub(body.len());
        if chunk.len() > remaining {
            body.extend_from_slice(&chunk[..remaining]);
            return Ok((body, true));
        }
        body.extend_from_slice(&chunk);
    }

    Ok((body, false))
}

/// Builds a reqwest client with the shared connect timeout and gzip support.
#[allow(deprecated)]
pub(crate) fn build_client(
    user_agent: &str,
    timeout: Duration,
    accept_invalid_certs: bool,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS).min(timeout))
        .timeout(timeout)
        .gzip(true)
        .user_agent(user_agent)
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
}
