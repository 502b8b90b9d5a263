//! Page fetching for the crawler.
//!
//! The crawler only needs one capability from the network: "fetch this URL
//! and give me the bytes, or tell me it failed". [`PageFetcher`] is that
//! seam; [`HttpClient`] is the reqwest-backed implementation used in
//! production, and tests substitute canned fetchers.
//!
//! # Example
//!
//! ```no_run
//! use quote_radar_core::fetch::{HttpClient, PageFetcher};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new()?;
//! let body = client.fetch("https://example.com").await?;
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod error;

pub use client::HttpClient;
pub(crate) use client::{build_client, read_bounded};
pub use error::FetchError;

use async_trait::async_trait;

/// Capability to retrieve a page body.
///
/// Implementations must be safe to share across the crawler's worker tasks.
/// Uses `async_trait` so the orchestrator can hold an `Arc<dyn PageFetcher>`.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and returns the raw response body.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}
