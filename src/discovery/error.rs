//! Error types for discovery strategies.
//!
//! Strategies never surface these to the orchestrator: they are logged and
//! the strategy degrades to an empty result. They exist so each failure is
//! logged with its cause and so construction problems can be reported.

use thiserror::Error;

use crate::fetch::FetchError;

/// Errors raised while querying a discovery source.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Transport failure or non-success status from the data source.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The data source answered with something other than the expected JSON,
    /// or with more of it than the size cap allows.
    #[error("malformed response from {url}: {reason}")]
    MalformedResponse {
        /// The query URL.
        url: String,
        /// Why the payload was rejected.
        reason: String,
    },

    /// The configured endpoint is not a usable base URL.
    #[error("invalid discovery endpoint: {endpoint}")]
    InvalidEndpoint {
        /// The rejected endpoint.
        endpoint: String,
    },
}

impl DiscoveryError {
    /// Creates a malformed-response error.
    pub fn malformed(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::MalformedResponse {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates an invalid-endpoint error.
    pub fn invalid_endpoint(endpoint: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_response_display() {
        let source = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let msg = DiscoveryError::malformed("https://crt.sh/?q=x", source).to_string();
        assert!(msg.contains("malformed response"), "got: {msg}");
        assert!(msg.contains("https://crt.sh/?q=x"), "got: {msg}");
    }

    #[test]
    fn test_fetch_error_is_transparent() {
        let msg = DiscoveryError::from(FetchError::http_status("https://crt.sh/", 502)).to_string();
        assert_eq!(msg, "HTTP 502 fetching https://crt.sh/");
    }
}
