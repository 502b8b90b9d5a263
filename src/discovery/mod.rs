//! Candidate website discovery.
//!
//! Discovery is a priority-ordered chain of [`DomainSource`] strategies.
//! The [`Discoverer`] asks each source in turn and returns the first
//! non-empty answer:
//!
//! - [`CertificateTransparencySource`] - recently issued certificates from a
//!   crt.sh-compatible endpoint (primary)
//! - [`DnsProbeSource`] - random names that happen to resolve (fallback)
//!
//! Sources never fail outward. Transport and decoding problems are logged
//! inside the source, which then reports nothing.
//!
//! # Example
//!
//! ```no_run
//! use quote_radar_core::discovery::{Discoverer, DiscoveryConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let discoverer = Discoverer::with_defaults(&DiscoveryConfig::default());
//! for domain in discoverer.discover(30).await {
//!     println!("{domain}");
//! }
//! # Ok(())
//! # }
//! ```

mod ct;
mod dns;
mod error;

pub use ct::{
    CT_SUFFIXES, CertificateRecord, CertificateTransparencySource, DEFAULT_CT_ENDPOINT,
    DEFAULT_LOOKBACK, after_date,
};
pub use dns::{
    DEFAULT_PROBE_COUNT, DnsProbeSource, NameResolver, PROBE_SUFFIXES, SystemResolver,
    synthesize_names,
};
pub use error::DiscoveryError;

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::domain::Domain;
use crate::fetch::constants::DISCOVERY_TIMEOUT_SECS;

/// Default number of candidates requested per cycle.
pub const DEFAULT_DISCOVERY_LIMIT: usize = 30;

/// A strategy that produces candidate domains.
///
/// Implementations swallow their own failures: an unavailable source
/// returns an empty list so the next one can be tried.
#[async_trait]
pub trait DomainSource: Send + Sync {
    /// Returns the source's name for logging.
    fn name(&self) -> &str;

    /// Returns up to `limit` distinct, validated domains.
    async fn discover(&self, limit: usize) -> Vec<Domain>;
}

/// Settings for the built-in discovery chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Certificate-transparency endpoint.
    pub ct_endpoint: String,
    /// Request timeout for CT queries.
    pub timeout: Duration,
    /// How far back certificates are considered new.
    pub lookback: Duration,
    /// Names synthesized per DNS probe run.
    pub dns_probe_count: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            ct_endpoint: DEFAULT_CT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DISCOVERY_TIMEOUT_SECS),
            lookback: DEFAULT_LOOKBACK,
            dns_probe_count: DEFAULT_PROBE_COUNT,
        }
    }
}

/// Priority-ordered chain of discovery sources.
///
/// Sources are tried in registration order; the first one that returns at
/// least one domain wins and the rest are skipped.
#[derive(Default)]
pub struct Discoverer {
    sources: Vec<Box<dyn DomainSource>>,
}

impl std::fmt::Debug for Discoverer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Discoverer")
            .field("sources", &self.source_names())
            .finish()
    }
}

impl Discoverer {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the default chain: certificate transparency, then DNS probing.
    ///
    /// If the CT source cannot be constructed (bad endpoint, client build
    /// failure) it is left out and only DNS probing remains.
    #[must_use]
    pub fn with_defaults(config: &DiscoveryConfig) -> Self {
        let mut discoverer = Self::new();

        match CertificateTransparencySource::new(&config.ct_endpoint, config.timeout) {
            Ok(source) => discoverer.register(Box::new(source.with_lookback(config.lookback))),
            Err(error) => warn!(
                error = %error,
                "certificate transparency source unavailable; continuing with DNS probing only"
            ),
        }

        discoverer.register(Box::new(DnsProbeSource::new(config.dns_probe_count)));
        discoverer
    }

    /// Appends a source at the lowest priority.
    pub fn register(&mut self, source: Box<dyn DomainSource>) {
        debug!(source = source.name(), "registering discovery source");
        self.sources.push(source);
    }

    /// Returns the registered source names in priority order.
    #[must_use]
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Returns up to `limit` domains from the first source that finds any.
    #[instrument(skip(self))]
    pub async fn discover(&self, limit: usize) -> Vec<Domain> {
        if limit == 0 {
            return Vec::new();
        }

        for source in &self.sources {
            let mut domains = source.discover(limit).await;
            if domains.is_empty() {
                info!(source = source.name(), "source found nothing; falling back");
                continue;
            }
            domains.truncate(limit);
            info!(
                source = source.name(),
                count = domains.len(),
                "domains discovered"
            );
            return domains;
        }

        warn!("no discovery source produced any domains");
        Vec::new()
    }
}
