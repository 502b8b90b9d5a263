//! CLI entry point for quote-radar.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use quote_radar_core::crawl::{CrawlOrchestrator, CycleStats, CycleTrigger, TriggerOutcome};
use quote_radar_core::discovery::Discoverer;
use quote_radar_core::fetch::HttpClient;
use quote_radar_core::{Database, QuoteRecord, QuoteStore};
use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

mod app_config;
mod cli;

use app_config::Settings;
use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    init_tracing(default_log_level(args.quiet, args.verbose));
    debug!(?args, "CLI arguments parsed");

    let file_config = app_config::load_file_config(args.config.as_deref())?;
    let settings = Settings::resolve(&args, file_config.as_ref());
    debug!(?settings, from_file = file_config.is_some(), "settings resolved");

    let db = Database::new(&settings.db_path).await.with_context(|| {
        format!(
            "Failed to open quote database '{}'",
            settings.db_path.display()
        )
    })?;
    let store = QuoteStore::new(db.clone());

    let result = match args.command {
        Command::Discover => run_discover(&settings, store).await,
        Command::Quotes { limit, json } => run_quotes(&store, limit, json).await,
        Command::Watch { interval_secs } => {
            run_watch(&settings, store, Duration::from_secs(interval_secs)).await
        }
    };

    db.close().await;
    result
}

/// Priority: RUST_LOG env var > quiet flag > verbose flag > default (info).
fn default_log_level(quiet: bool, verbose: u8) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Logs go to stderr so `quotes --json` output stays machine-readable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn build_orchestrator(settings: &Settings, store: QuoteStore) -> Result<CrawlOrchestrator> {
    let fetcher =
        HttpClient::with_timeout(settings.page_timeout_secs).context("Failed to build HTTP client")?;
    let discoverer = Discoverer::with_defaults(&settings.discovery);
    CrawlOrchestrator::new(discoverer, Arc::new(fetcher), store, settings.crawl)
        .context("Invalid crawl settings")
}

async fn run_discover(settings: &Settings, store: QuoteStore) -> Result<()> {
    let orchestrator = build_orchestrator(settings, store)?;
    info!("Quote Radar starting discovery cycle");

    let stats = orchestrator.run_cycle().await;
    println!("{}", cycle_summary(&stats));
    Ok(())
}

/// Public shape of a listed quote.
#[derive(Debug, Serialize)]
struct QuoteView<'a> {
    website: &'a str,
    quote: &'a str,
    discovered_at: &'a str,
}

impl<'a> From<&'a QuoteRecord> for QuoteView<'a> {
    fn from(record: &'a QuoteRecord) -> Self {
        Self {
            website: &record.website,
            quote: &record.quote,
            discovered_at: &record.discovered_at,
        }
    }
}

async fn run_quotes(store: &QuoteStore, limit: u32, json: bool) -> Result<()> {
    let records = store
        .recent(limit)
        .await
        .context("Failed to load recent quotes")?;

    if json {
        let views: Vec<QuoteView<'_>> = records.iter().map(QuoteView::from).collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No quotes yet. Run `quote-radar discover` to find some.");
        return Ok(());
    }

    for record in &records {
        println!("{}  {}", record.discovered_at, record.website);
        println!("    \"{}\"", record.quote);
    }
    Ok(())
}

async fn run_watch(settings: &Settings, store: QuoteStore, interval: Duration) -> Result<()> {
    let orchestrator = Arc::new(build_orchestrator(settings, store)?);
    let trigger = CycleTrigger::spawn(orchestrator);

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        interval_secs = interval.as_secs(),
        "Watching for new sites; press Ctrl-C to stop"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => match trigger.trigger() {
                TriggerOutcome::Started => debug!("cycle started"),
                TriggerOutcome::AlreadyRunning => {
                    info!("Previous cycle still running; skipping this tick");
                }
                TriggerOutcome::Unavailable => {
                    warn!("Cycle worker stopped; exiting watch");
                    break;
                }
            },
            signal = tokio::signal::ctrl_c() => {
                if let Err(error) = signal {
                    warn!(error = %error, "failed to listen for Ctrl-C");
                }
                info!("Interrupted; waiting for the running cycle to finish");
                break;
            }
        }
    }

    trigger.shutdown().await;
    Ok(())
}

fn cycle_summary(stats: &CycleStats) -> String {
    format!(
        "Discovered {} sites, crawled {}: {} quotes saved, {} without quotes, {} failed",
        stats.discovered(),
        stats.selected(),
        stats.saved(),
        stats.empty(),
        stats.failed()
    )
}
