//! Certificate-transparency discovery.
//!
//! Newly issued TLS certificates are a cheap feed of freshly deployed sites.
//! This strategy asks a crt.sh-compatible endpoint for certificates issued
//! within the lookback window, one query per TLD suffix, and turns each
//! certificate's subject name into a candidate [`Domain`].

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{DiscoveryError, DomainSource};
use crate::domain::Domain;
use crate::fetch::constants::MAX_DISCOVERY_BYTES;
use crate::fetch::{FetchError, build_client, read_bounded};
use crate::user_agent;

/// Default crt.sh query endpoint.
pub const DEFAULT_CT_ENDPOINT: &str = "https://crt.sh/";

/// TLD suffixes queried, in order.
pub const CT_SUFFIXES: [&str; 3] = ["com", "org", "net"];

/// Default lookback window (24 hours).
pub const DEFAULT_LOOKBACK: Duration = Duration::from_secs(24 * 60 * 60);

/// One certificate entry as returned by the endpoint.
///
/// Only the subject name is consumed; every other field is ignored. A missing
/// or `null` name deserializes to `None` so one bad entry never sinks the
/// rest of the list.
#[derive(Debug, Clone, Deserialize)]
pub struct CertificateRecord {
    /// Subject name(s) of the certificate.
    #[serde(default)]
    pub name_value: Option<String>,
}

/// Discovery strategy backed by a certificate-transparency search endpoint.
#[derive(Debug, Clone)]
pub struct CertificateTransparencySource {
    client: Client,
    endpoint: Url,
    suffixes: Vec<String>,
    lookback: Duration,
    max_response_bytes: usize,
}

impl CertificateTransparencySource {
    /// Creates a source querying `endpoint` with the given request budget.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::InvalidEndpoint`] if `endpoint` is not an
    /// absolute URL, or a fetch error if the HTTP client cannot be built.
    #[instrument(level = "debug")]
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, DiscoveryError> {
        let endpoint =
            Url::parse(endpoint).map_err(|_| DiscoveryError::invalid_endpoint(endpoint))?;
        if endpoint.cannot_be_a_base() {
            return Err(DiscoveryError::invalid_endpoint(endpoint.as_str()));
        }
        let client = build_client(&user_agent::discovery_user_agent(), timeout, false)
            .map_err(FetchError::ClientBuild)?;

        Ok(Self {
            client,
            endpoint,
            suffixes: CT_SUFFIXES.iter().map(ToString::to_string).collect(),
            lookback: DEFAULT_LOOKBACK,
            max_response_bytes: MAX_DISCOVERY_BYTES,
        })
    }

    /// Overrides the lookback window.
    #[must_use]
    pub fn with_lookback(mut self, lookback: Duration) -> Self {
        self.lookback = lookback;
        self
    }

    /// Overrides the response size cap.
    #[must_use]
    pub fn with_max_response_bytes(mut self, max_response_bytes: usize) -> Self {
        self.max_response_bytes = max_response_bytes;
        self
    }

    /// Overrides the queried TLD suffixes (without leading dot).
    #[must_use]
    pub fn with_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    /// Builds the query URL for one suffix.
    fn query_url(&self, suffix: &str, after: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("output", "json")
            .append_pair("q", &format!("%.{suffix}"))
            .append_pair("after", after);
        url
    }

    /// Fetches and decodes the certificate list for one suffix.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscoveryError`] on transport failure or non-success
    /// status, and [`DiscoveryError::MalformedResponse`] for a payload that
    /// is not JSON or exceeds the size cap.
    #[instrument(skip(self), fields(suffix = %suffix))]
    pub async fn query_suffix(
        &self,
        suffix: &str,
        after: &str,
    ) -> Result<Vec<CertificateRecord>, DiscoveryError> {
        let url = self.query_url(suffix, after);
        info!(url = %url, "querying certificate transparency log");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url.as_str(), status.as_u16()).into());
        }

        let (body, truncated) =
            read_bounded(response, url.as_str(), self.max_response_bytes).await?;
        if truncated {
            return Err(DiscoveryError::malformed(
                url.as_str(),
                format!("response exceeds {} bytes", self.max_response_bytes),
            ));
        }

        let records: Vec<CertificateRecord> = serde_json::from_slice(&body)
            .map_err(|e| DiscoveryError::malformed(url.as_str(), e))?;
        info!(certificates = records.len(), "certificates received");
        Ok(records)
    }
}

#[async_trait]
impl DomainSource for CertificateTransparencySource {
    fn name(&self) -> &str {
        "certificate_transparency"
    }

    async fn discover(&self, limit: usize) -> Vec<Domain> {
        let after = after_date(Utc::now(), self.lookback);
        let mut seen = HashSet::new();
        let mut domains = Vec::new();

        for suffix in &self.suffixes {
            if domains.len() >= limit {
                break;
            }
            let records = match self.query_suffix(suffix, &after).await {
                Ok(records) => records,
                Err(error) => {
                    warn!(suffix = %suffix, error = %error, "certificate transparency query failed");
                    continue;
                }
            };

            for record in records {
                let Some(domain) = record.name_value.as_deref().and_then(Domain::parse) else {
                    continue;
                };
                if seen.insert(domain.clone()) {
                    domains.push(domain);
                    if domains.len() >= limit {
                        break;
                    }
                }
            }
        }

        debug!(count = domains.len(), "certificate transparency candidates");
        domains
    }
}

/// Formats the `after=` filter: the calendar date `lookback` before `now`.
#[must_use]
pub fn after_date(now: DateTime<Utc>, lookback: Duration) -> String {
    let since = TimeDelta::from_std(lookback)
        .ok()
        .and_then(|delta| now.checked_sub_signed(delta))
        .unwrap_or(now);
    since.format("%Y-%m-%d").to_string()
}
