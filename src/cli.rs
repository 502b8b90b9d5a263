//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Default number of quotes listed by `quotes`.
pub const DEFAULT_QUOTES_LIMIT: u32 = 20;

/// Default delay between `watch` cycles, in seconds.
pub const DEFAULT_WATCH_INTERVAL_SECS: u64 = 600;

/// Find freshly launched websites and collect quotes from them.
///
/// Quote Radar discovers new domains from certificate-transparency logs
/// (falling back to DNS probing), crawls a handful of them, and keeps the
/// best quote found on each site in a local SQLite database.
#[derive(Parser, Debug)]
#[command(name = "quote-radar")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Quote database path [default: quotes.db]
    #[arg(long, value_name = "PATH", global = true)]
    pub db: Option<PathBuf>,

    /// Config file path [default: $XDG_CONFIG_HOME/quote-radar/config.toml]
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Maximum sites crawled concurrently (1-100) [default: 5]
    #[arg(short = 'c', long, global = true, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: Option<u8>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run one discovery and crawl cycle, then print a summary
    Discover,

    /// List the most recently discovered quotes
    Quotes {
        /// Maximum number of quotes to list (1-1000)
        #[arg(short = 'n', long, default_value_t = DEFAULT_QUOTES_LIMIT, value_parser = clap::value_parser!(u32).range(1..=1000))]
        limit: u32,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Trigger a cycle on a fixed interval until interrupted
    Watch {
        /// Seconds between cycle triggers (10-86400)
        #[arg(long, default_value_t = DEFAULT_WATCH_INTERVAL_SECS, value_parser = clap::value_parser!(u64).range(10..=86_400))]
        interval_secs: u64,
    },
}
