//! Crawl cycle orchestration.
//!
//! A cycle discovers candidate sites, fetches a bounded number of them
//! concurrently, extracts quotes from each page and persists the single best
//! quote per site. Nothing in a cycle is fatal: every per-site failure is
//! logged, counted in [`CycleStats`] and isolated from the other sites.
//!
//! # Concurrency Model
//!
//! - Each site runs in its own Tokio task
//! - A semaphore permit is acquired before spawning, so at most
//!   `concurrency` sites are in flight
//! - Each task persists its own result as soon as it has one
//! - The cycle returns only after every task has finished
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use quote_radar_core::crawl::{CrawlConfig, CrawlOrchestrator};
//! use quote_radar_core::discovery::{Discoverer, DiscoveryConfig};
//! use quote_radar_core::fetch::HttpClient;
//! use quote_radar_core::{Database, QuoteStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = QuoteStore::new(Database::new_in_memory().await?);
//! let orchestrator = CrawlOrchestrator::new(
//!     Discoverer::with_defaults(&DiscoveryConfig::default()),
//!     Arc::new(HttpClient::new()?),
//!     store,
//!     CrawlConfig::default(),
//! )?;
//! let stats = orchestrator.run_cycle().await;
//! println!("saved {} of {} sites", stats.saved(), stats.selected());
//! # Ok(())
//! # }
//! ```

mod trigger;

pub use trigger::{CycleTrigger, TriggerOutcome};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use crate::discovery::{DEFAULT_DISCOVERY_LIMIT, Discoverer};
use crate::domain::Domain;
use crate::extract::{QuoteCandidate, QuoteExtractor};
use crate::fetch::PageFetcher;
use crate::store::QuoteStore;

/// Minimum allowed concurrency value.
const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
const MAX_CONCURRENCY: usize = 100;

/// Default number of sites crawled at once.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Default number of discovered sites crawled per cycle.
pub const DEFAULT_MAX_SITES: usize = 10;

/// Error type for orchestrator construction.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },
}

/// Tunables for a crawl cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlConfig {
    /// Maximum sites crawled at once (1-100).
    pub concurrency: usize,
    /// Candidates requested from discovery.
    pub discovery_limit: usize,
    /// Candidates actually crawled, taken from the front of the discovered list.
    pub max_sites: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            discovery_limit: DEFAULT_DISCOVERY_LIMIT,
            max_sites: DEFAULT_MAX_SITES,
        }
    }
}

/// Outcome counts of one crawl cycle.
///
/// Counters are atomic so crawl tasks can update them concurrently.
#[derive(Debug, Default)]
pub struct CycleStats {
    discovered: AtomicUsize,
    selected: AtomicUsize,
    saved: AtomicUsize,
    empty: AtomicUsize,
    failed: AtomicUsize,
}

impl CycleStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of domains discovery produced.
    #[must_use]
    pub fn discovered(&self) -> usize {
        self.discovered.load(Ordering::SeqCst)
    }

    /// Returns the number of domains picked for crawling.
    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected.load(Ordering::SeqCst)
    }

    /// Returns the number of sites whose best quote was persisted.
    #[must_use]
    pub fn saved(&self) -> usize {
        self.saved.load(Ordering::SeqCst)
    }

    /// Returns the number of sites fetched without any acceptable quote.
    #[must_use]
    pub fn empty(&self) -> usize {
        self.empty.load(Ordering::SeqCst)
    }

    /// Returns the number of sites that failed to fetch, extract or persist.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Returns the number of sites with a final outcome.
    #[must_use]
    pub fn total(&self) -> usize {
        self.saved() + self.empty() + self.failed()
    }

    fn snapshot(&self) -> Self {
        let copy = Self::new();
        copy.discovered.store(self.discovered(), Ordering::SeqCst);
        copy.selected.store(self.selected(), Ordering::SeqCst);
        copy.saved.store(self.saved(), Ordering::SeqCst);
        copy.empty.store(self.empty(), Ordering::SeqCst);
        copy.failed.store(self.failed(), Ordering::SeqCst);
        copy
    }
}

/// Runs discovery, crawling and persistence for one cycle at a time.
///
/// The orchestrator owns its [`Discoverer`]; fetcher, extractor and store are
/// shared with the per-site tasks.
pub struct CrawlOrchestrator {
    discoverer: Discoverer,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<QuoteExtractor>,
    store: QuoteStore,
    semaphore: Arc<Semaphore>,
    config: CrawlConfig,
}

impl std::fmt::Debug for CrawlOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlOrchestrator")
            .field("discoverer", &self.discoverer)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CrawlOrchestrator {
    /// Creates an orchestrator using the built-in quote extractor.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::InvalidConcurrency`] if
    /// `config.concurrency` is outside 1-100.
    #[instrument(level = "debug", skip(discoverer, fetcher, store))]
    pub fn new(
        discoverer: Discoverer,
        fetcher: Arc<dyn PageFetcher>,
        store: QuoteStore,
        config: CrawlConfig,
    ) -> Result<Self, OrchestratorError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&config.concurrency) {
            return Err(OrchestratorError::InvalidConcurrency {
                value: config.concurrency,
            });
        }

        debug!(
            concurrency = config.concurrency,
            discovery_limit = config.discovery_limit,
            max_sites = config.max_sites,
            sources = ?discoverer.source_names(),
            "creating crawl orchestrator"
        );

        Ok(Self {
            discoverer,
            fetcher,
            extractor: Arc::new(QuoteExtractor::new()),
            store,
            semaphore: Arc::new(Semaphore::new(config.concurrency)),
            config,
        })
    }

    /// Replaces the quote extractor.
    #[must_use]
    pub fn with_extractor(mut self, extractor: QuoteExtractor) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    /// Returns the quote store results are written to.
    #[must_use]
    pub fn store(&self) -> &QuoteStore {
        &self.store
    }

    /// Runs one full crawl cycle.
    ///
    /// Never fails: discovery, fetch, extraction and persistence problems
    /// are logged and reflected in the returned counts.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> CycleStats {
        let stats = Arc::new(CycleStats::new());

        let mut domains = self.discoverer.discover(self.config.discovery_limit).await;
        stats.discovered.store(domains.len(), Ordering::SeqCst);
        domains.truncate(self.config.max_sites);
        stats.selected.store(domains.len(), Ordering::SeqCst);

        info!(
            discovered = stats.discovered(),
            selected = stats.selected(),
            "starting crawl cycle"
        );

        let mut handles = Vec::with_capacity(domains.len());
        for domain in domains {
            let Ok(permit) = Arc::clone(&self.semaphore).acquire_owned().await else {
                warn!("crawl semaphore closed; abandoning remaining sites");
                break;
            };

            let fetcher = Arc::clone(&self.fetcher);
            let extractor = Arc::clone(&self.extractor);
            let store = self.store.clone();
            let stats = Arc::clone(&stats);

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                crawl_site(fetcher.as_ref(), extractor, &store, &domain, &stats).await;
            }));
        }

        debug!(task_count = handles.len(), "waiting for crawl tasks");

        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "crawl task panicked");
                stats.failed.fetch_add(1, Ordering::SeqCst);
            }
        }

        info!(
            saved = stats.saved(),
            empty = stats.empty(),
            failed = stats.failed(),
            total = stats.total(),
            "crawl cycle complete"
        );

        Arc::try_unwrap(stats).unwrap_or_else(|shared| shared.snapshot())
    }
}

/// Fetches one site, extracts its quotes and persists the best one.
async fn crawl_site(
    fetcher: &dyn PageFetcher,
    extractor: Arc<QuoteExtractor>,
    store: &QuoteStore,
    domain: &Domain,
    stats: &CycleStats,
) {
    let url = normalize_url(domain.as_str());

    let page = match fetcher.fetch(&url).await {
        Ok(page) => page,
        Err(error) => {
            warn!(domain = %domain, error = %error, "fetch failed");
            stats.failed.fetch_add(1, Ordering::SeqCst);
            return;
        }
    };

    let candidates = match tokio::task::spawn_blocking(move || extractor.extract(&page)).await {
        Ok(candidates) => candidates,
        Err(error) => {
            warn!(domain = %domain, error = %error, "quote extraction aborted");
            stats.failed.fetch_add(1, Ordering::SeqCst);
            return;
        }
    };

    let Some(best) = select_best(&candidates) else {
        debug!(domain = %domain, "no quotes found");
        stats.empty.fetch_add(1, Ordering::SeqCst);
        return;
    };

    match store.save(domain.as_str(), &best.text).await {
        Ok(id) => {
            info!(domain = %domain, id, pattern = %best.pattern, "quote saved");
            stats.saved.fetch_add(1, Ordering::SeqCst);
        }
        Err(error) => {
            warn!(domain = %domain, error = %error, "failed to save quote");
            stats.failed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Turns a bare host into an absolute URL, defaulting to HTTPS.
///
/// Input that already carries an `http://` or `https://` scheme is returned
/// unchanged.
#[must_use]
pub fn normalize_url(site: &str) -> String {
    let lower = site.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        site.to_string()
    } else {
        format!("https://{site}")
    }
}

/// Picks the longest candidate by character count; the earliest wins ties.
#[must_use]
pub fn select_best(candidates: &[QuoteCandidate]) -> Option<&QuoteCandidate> {
    candidates.iter().fold(None, |best, candidate| match best {
        Some(current) if current.char_len() >= candidate.char_len() => Some(current),
        _ => Some(candidate),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::Database;
    use crate::discovery::DomainSource;
    use crate::extract::QuotePattern;
    use crate::fetch::FetchError;

    fn candidate(text: &str) -> QuoteCandidate {
        QuoteCandidate {
            text: text.to_string(),
            pattern: QuotePattern::DoubleQuoted,
            word_count: text.split_whitespace().count(),
        }
    }

    struct ListSource(Vec<&'static str>);

    #[async_trait]
    impl DomainSource for ListSource {
        fn name(&self) -> &str {
            "list"
        }

        async fn discover(&self, limit: usize) -> Vec<Domain> {
            self.0
                .iter()
                .filter_map(|d| Domain::parse(d))
                .take(limit)
                .collect()
        }
    }

    /// Serves canned pages keyed by URL; unknown URLs fail with 404.
    struct CannedFetcher(HashMap<String, String>);

    #[async_trait]
    impl PageFetcher for CannedFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.0
                .get(url)
                .map(|page| page.clone().into_bytes())
                .ok_or_else(|| FetchError::http_status(url, 404))
        }
    }

    async fn orchestrator(
        sites: Vec<&'static str>,
        pages: &[(&str, &str)],
    ) -> CrawlOrchestrator {
        let mut discoverer = Discoverer::new();
        discoverer.register(Box::new(ListSource(sites)));
        let fetcher = CannedFetcher(
            pages
                .iter()
                .map(|(url, page)| ((*url).to_string(), (*page).to_string()))
                .collect(),
        );
        let store = QuoteStore::new(Database::new_in_memory().await.unwrap());
        CrawlOrchestrator::new(discoverer, Arc::new(fetcher), store, CrawlConfig::default())
            .unwrap()
    }

    #[test]
    fn test_select_best_prefers_longest() {
        let short = "x".repeat(40);
        let long = "y".repeat(60);
        let candidates = vec![candidate(&short), candidate(&long)];
        assert_eq!(select_best(&candidates).unwrap().text, long);
    }

    #[test]
    fn test_select_best_first_wins_ties() {
        let candidates = vec![
            candidate("first candidate of equal size"),
            candidate("other candidate of equal size"),
        ];
        assert_eq!(
            select_best(&candidates).unwrap().text,
            "first candidate of equal size"
        );
    }

    #[test]
    fn test_select_best_counts_chars_not_bytes() {
        let wide = "ä".repeat(30);
        let narrow = "a".repeat(40);
        let candidates = vec![candidate(&wide), candidate(&narrow)];
        assert_eq!(select_best(&candidates).unwrap().text, narrow);
    }

    #[test]
    fn test_select_best_empty() {
        assert!(select_best(&[]).is_none());
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_url("https://example.com"), "https://example.com");
        assert_eq!(normalize_url("HTTPS://example.com"), "HTTPS://example.com");
    }

    #[tokio::test]
    async fn test_new_rejects_invalid_concurrency() {
        let store = QuoteStore::new(Database::new_in_memory().await.unwrap());
        for value in [0, 101] {
            let config = CrawlConfig {
                concurrency: value,
                ..CrawlConfig::default()
            };
            let result = CrawlOrchestrator::new(
                Discoverer::new(),
                Arc::new(CannedFetcher(HashMap::new())),
                store.clone(),
                config,
            );
            assert!(matches!(
                result,
                Err(OrchestratorError::InvalidConcurrency { value: v }) if v == value
            ));
        }
    }

    #[tokio::test]
    async fn test_run_cycle_persists_longest_quote() {
        let forty = "forty characters of quoted text here now";
        let sixty = "sixty characters of quoted text, long enough to win the pick";
        assert_eq!(forty.chars().count(), 40);
        assert_eq!(sixty.chars().count(), 60);
        let page = format!("<p>\"{forty}\" and \"{sixty}\"</p>");

        let orchestrator =
            orchestrator(vec!["quotes.example"], &[("https://quotes.example", &page)]).await;
        let stats = orchestrator.run_cycle().await;

        assert_eq!(stats.saved(), 1);
        let records = orchestrator.store().recent(10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].website, "quotes.example");
        assert_eq!(records[0].quote, sixty);
    }

    #[tokio::test]
    async fn test_run_cycle_isolates_failures() {
        let page = "<p>\"a quote that is long enough to be kept\"</p>";
        let orchestrator = orchestrator(
            vec!["good.example", "missing.example", "blank.example"],
            &[
                ("https://good.example", page),
                ("https://blank.example", "<p>nothing here</p>"),
            ],
        )
        .await;

        let stats = orchestrator.run_cycle().await;
        assert_eq!(stats.discovered(), 3);
        assert_eq!(stats.selected(), 3);
        assert_eq!(stats.saved(), 1);
        assert_eq!(stats.empty(), 1);
        assert_eq!(stats.failed(), 1);
        assert_eq!(orchestrator.store().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_with_extractor_replaces_matchers() {
        let page = "<p>\"a quote that is long enough to be kept\"</p>";
        let orchestrator = orchestrator(vec!["good.example"], &[("https://good.example", page)])
            .await
            .with_extractor(QuoteExtractor::with_matchers(Vec::new()));

        let stats = orchestrator.run_cycle().await;
        assert_eq!(stats.saved(), 0);
        assert_eq!(stats.empty(), 1);
        assert_eq!(orchestrator.store().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_run_cycle_with_no_domains() {
        let orchestrator = orchestrator(vec![], &[]).await;
        let stats = orchestrator.run_cycle().await;
        assert_eq!(stats.discovered(), 0);
        assert_eq!(stats.total(), 0);
    }
}
