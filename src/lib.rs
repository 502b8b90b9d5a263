//! Quote Radar Core Library
//!
//! This library finds freshly launched websites and harvests quotes from
//! them: recently issued TLS certificates (or, failing that, random DNS
//! probes) name the candidate sites, a bounded crawler fetches a handful of
//! them, and the best quote from each page is kept in SQLite.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`domain`] - Candidate domain validation
//! - [`discovery`] - Certificate-transparency and DNS-probe discovery chain
//! - [`fetch`] - HTTP page fetching with bounded bodies
//! - [`extract`] - Heuristic quote extraction from HTML
//! - [`store`] - Quote persistence
//! - [`crawl`] - Cycle orchestration and on-demand triggering
//! - [`db`] - Database connection and schema management

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod crawl;
pub mod db;
pub mod discovery;
pub mod domain;
pub mod extract;
pub mod fetch;
pub mod store;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use crawl::{
    CrawlConfig, CrawlOrchestrator, CycleStats, CycleTrigger, DEFAULT_CONCURRENCY,
    OrchestratorError, TriggerOutcome,
};
pub use db::{Database, DbError};
pub use discovery::{Discoverer, DiscoveryConfig, DomainSource};
pub use domain::{Domain, is_valid_domain};
pub use extract::{QuoteCandidate, QuoteExtractor, is_good_quote};
pub use fetch::{FetchError, HttpClient, PageFetcher};
pub use store::{QuoteRecord, QuoteStore, StoreError};
