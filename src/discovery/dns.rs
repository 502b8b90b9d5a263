//! Synthetic-name DNS probing.
//!
//! Last-resort discovery: invent random short names under common TLDs and
//! keep the ones that resolve. Yield is low and nothing about the result is
//! "new", but it keeps the crawler fed when the CT endpoint is unavailable.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument, trace};

use super::DomainSource;
use crate::domain::Domain;

/// Default number of names synthesized per probe run.
pub const DEFAULT_PROBE_COUNT: usize = 20;

/// Suffixes appended to synthesized base names.
pub const PROBE_SUFFIXES: [&str; 5] = [".com", ".org", ".net", ".io", ".co"];

/// Inclusive length range of synthesized base names.
const BASE_NAME_LEN: std::ops::RangeInclusive<usize> = 5..=10;

/// Upper bound on a single lookup; system resolvers can stall for much longer.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Forward name resolution, success or failure only.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Returns true if `host` resolves to at least one address.
    async fn resolves(&self, host: &str) -> bool;
}

/// Resolver using the operating system's lookup (`getaddrinfo`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl NameResolver for SystemResolver {
    async fn resolves(&self, host: &str) -> bool {
        match tokio::time::timeout(LOOKUP_TIMEOUT, tokio::net::lookup_host((host, 80))).await {
            Ok(Ok(mut addrs)) => addrs.next().is_some(),
            Ok(Err(error)) => {
                trace!(host, error = %error, "lookup failed");
                false
            }
            Err(_) => {
                trace!(host, "lookup timed out");
                false
            }
        }
    }
}

/// Discovery strategy that probes random names.
#[derive(Clone)]
pub struct DnsProbeSource {
    resolver: Arc<dyn NameResolver>,
    probe_count: usize,
}

impl std::fmt::Debug for DnsProbeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsProbeSource")
            .field("probe_count", &self.probe_count)
            .finish_non_exhaustive()
    }
}

impl DnsProbeSource {
    /// Creates a probe source using the system resolver.
    #[must_use]
    pub fn new(probe_count: usize) -> Self {
        Self::with_resolver(Arc::new(SystemResolver), probe_count)
    }

    /// Creates a probe source using a custom resolver.
    #[must_use]
    pub fn with_resolver(resolver: Arc<dyn NameResolver>, probe_count: usize) -> Self {
        Self {
            resolver,
            probe_count,
        }
    }

    /// Returns the number of names synthesized per run.
    #[must_use]
    pub fn probe_count(&self) -> usize {
        self.probe_count
    }
}

impl Default for DnsProbeSource {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_COUNT)
    }
}

#[async_trait]
impl DomainSource for DnsProbeSource {
    fn name(&self) -> &str {
        "dns_probe"
    }

    #[instrument(skip(self), fields(probe_count = self.probe_count))]
    async fn discover(&self, limit: usize) -> Vec<Domain> {
        let names = synthesize_names(&mut rand::thread_rng(), self.probe_count);

        let lookups = names.iter().map(|name| self.resolver.resolves(name));
        let outcomes = join_all(lookups).await;

        let domains: Vec<Domain> = names
            .iter()
            .zip(outcomes)
            .filter(|(_, resolved)| *resolved)
            .filter_map(|(name, _)| Domain::parse(name))
            .take(limit)
            .collect();

        debug!(
            probed = names.len(),
            resolved = domains.len(),
            "dns probe finished"
        );
        domains
    }
}

/// Generates `count` random names: 5–10 lowercase letters plus a probe suffix.
pub fn synthesize_names<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<String> {
    (0..count)
        .map(|_| {
            let len = rng.gen_range(BASE_NAME_LEN);
            let mut name: String = (0..len)
                .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
                .collect();
            name.push_str(PROBE_SUFFIXES.choose(rng).copied().unwrap_or(".com"));
            name
        })
        .collect()
}
