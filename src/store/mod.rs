//! Durable storage of discovered quotes.
//!
//! The store appends one [`QuoteRecord`] per successful crawl and lists
//! records newest first. It enforces no uniqueness: keeping a single quote
//! per site per cycle is the orchestrator's job.
//!
//! # Example
//!
//! ```no_run
//! use quote_radar_core::{Database, QuoteStore};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(Path::new("quotes.db")).await?;
//! let store = QuoteStore::new(db);
//! store.save("example.com", "A quote of sufficient length.").await?;
//! for record in store.recent(10).await? {
//!     println!("{}: {}", record.website, record.quote);
//! }
//! # Ok(())
//! # }
//! ```

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sqlx::FromRow;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::db::Database;

/// Errors from quote persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// A persisted quote.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct QuoteRecord {
    /// Surrogate key.
    pub id: i64,
    /// Domain the quote was found on.
    pub website: String,
    /// The quote text.
    pub quote: String,
    /// RFC 3339 UTC timestamp of the crawl that found it.
    pub discovered_at: String,
    /// Freshness flag for readers; written as true, never consulted here.
    pub is_new: bool,
}

/// SQLite-backed quote store.
#[derive(Debug, Clone)]
pub struct QuoteStore {
    db: Database,
}

impl QuoteStore {
    /// Creates a store on an initialized database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Appends a quote for `website`, stamped with the current time.
    ///
    /// Returns the new record's id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the insert fails.
    #[instrument(skip(self, quote), fields(website = %website, quote_len = quote.len()))]
    pub async fn save(&self, website: &str, quote: &str) -> Result<i64> {
        let discovered_at = now_timestamp();
        let (id,): (i64,) = sqlx::query_as(
            r"INSERT INTO quotes (website, quote, discovered_at, is_new)
              VALUES (?, ?, ?, 1)
              RETURNING id",
        )
        .bind(website)
        .bind(quote)
        .bind(&discovered_at)
        .fetch_one(self.db.pool())
        .await?;

        debug!(id, %discovered_at, "quote saved");
        Ok(id)
    }

    /// Returns up to `limit` records, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn recent(&self, limit: u32) -> Result<Vec<QuoteRecord>> {
        let records = sqlx::query_as::<_, QuoteRecord>(
            r"SELECT id, website, quote, discovered_at, is_new
              FROM quotes
              ORDER BY discovered_at DESC, id DESC
              LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(self.db.pool())
        .await?;

        Ok(records)
    }

    /// Returns the total number of stored quotes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM quotes")
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }
}

/// Current UTC time as a fixed-width RFC 3339 string, so lexical order is
/// chronological order.
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
