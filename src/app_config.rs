//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use quote_radar_core::crawl::CrawlConfig;
use quote_radar_core::discovery::DiscoveryConfig;
use quote_radar_core::fetch::constants::{DISCOVERY_TIMEOUT_SECS, PAGE_TIMEOUT_SECS};
use serde::Deserialize;
use url::Url;

use crate::cli::Args;

/// Database path used when neither the CLI nor the config file sets one.
pub const DEFAULT_DB_PATH: &str = "quotes.db";

/// TOML-backed file configuration for quote-radar defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Default quote database path.
    pub db_path: Option<PathBuf>,
    /// Default concurrency (same range as CLI).
    pub concurrency: Option<u8>,
    /// Candidates requested from discovery per cycle.
    pub discovery_limit: Option<usize>,
    /// Candidates crawled per cycle.
    pub max_sites: Option<usize>,
    /// Per-site page fetch timeout in seconds.
    pub page_timeout_secs: Option<u64>,
    /// Certificate-transparency query timeout in seconds.
    pub discovery_timeout_secs: Option<u64>,
    /// Certificate-transparency search endpoint.
    pub ct_endpoint: Option<String>,
    /// How many hours back a certificate counts as new.
    pub lookback_hours: Option<u64>,
    /// Names synthesized per DNS probe run.
    pub dns_probe_count: Option<usize>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(concurrency) = self.concurrency
            && !(1..=100).contains(&concurrency)
        {
            bail!("Invalid config value for `concurrency`: {concurrency}. Expected range: 1..=100");
        }

        validate_count("discovery_limit", self.discovery_limit, 1000)?;
        validate_count("max_sites", self.max_sites, 100)?;
        validate_count("dns_probe_count", self.dns_probe_count, 500)?;
        validate_timeout_secs("page_timeout_secs", self.page_timeout_secs)?;
        validate_timeout_secs("discovery_timeout_secs", self.discovery_timeout_secs)?;

        if let Some(hours) = self.lookback_hours
            && !(1..=720).contains(&hours)
        {
            bail!("Invalid config value for `lookback_hours`: {hours}. Expected range: 1..=720");
        }

        if let Some(endpoint) = self.ct_endpoint.as_deref() {
            validate_endpoint(endpoint)?;
        }

        Ok(())
    }
}

fn validate_count(field: &str, value: Option<usize>, max: usize) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=max).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..={max}");
    }
    Ok(())
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

fn validate_endpoint(endpoint: &str) -> Result<()> {
    let parsed = Url::parse(endpoint)
        .with_context(|| format!("Invalid config value for `ct_endpoint`: '{endpoint}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("Invalid config value for `ct_endpoint`: '{endpoint}'. Expected an http(s) URL");
    }
    Ok(())
}

/// Effective runtime settings after merging CLI, config file and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Quote database path.
    pub db_path: PathBuf,
    /// Per-site page fetch timeout in seconds.
    pub page_timeout_secs: u64,
    /// Crawl cycle tunables.
    pub crawl: CrawlConfig,
    /// Discovery chain settings.
    pub discovery: DiscoveryConfig,
}

impl Settings {
    /// Merges settings with precedence CLI flag > config file > built-in default.
    #[must_use]
    pub fn resolve(args: &Args, file: Option<&FileConfig>) -> Self {
        let file = file.cloned().unwrap_or_default();
        let crawl_defaults = CrawlConfig::default();
        let discovery_defaults = DiscoveryConfig::default();

        let db_path = args
            .db
            .clone()
            .or(file.db_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let concurrency = args
            .concurrency
            .or(file.concurrency)
            .map_or(crawl_defaults.concurrency, usize::from);

        Self {
            db_path,
            page_timeout_secs: file.page_timeout_secs.unwrap_or(PAGE_TIMEOUT_SECS),
            crawl: CrawlConfig {
                concurrency,
                discovery_limit: file
                    .discovery_limit
                    .unwrap_or(crawl_defaults.discovery_limit),
                max_sites: file.max_sites.unwrap_or(crawl_defaults.max_sites),
            },
            discovery: DiscoveryConfig {
                ct_endpoint: file.ct_endpoint.unwrap_or(discovery_defaults.ct_endpoint),
                timeout: Duration::from_secs(
                    file.discovery_timeout_secs
                        .unwrap_or(DISCOVERY_TIMEOUT_SECS),
                ),
                lookback: file
                    .lookback_hours
                    .map_or(discovery_defaults.lookback, |hours| {
                        Duration::from_secs(hours * 60 * 60)
                    }),
                dns_probe_count: file
                    .dns_probe_count
                    .unwrap_or(discovery_defaults.dns_probe_count),
            },
        }
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/quote-radar/config.toml`
/// 2. `$HOME/.config/quote-radar/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("quote-radar")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("quote-radar")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config file for this run.
///
/// An explicit `--config` path must exist. The default path is optional:
/// if it is missing, `Ok(None)` is returned and built-in defaults apply.
pub fn load_file_config(explicit: Option<&Path>) -> Result<Option<FileConfig>> {
    if let Some(path) = explicit {
        return read_file_config(path).map(Some);
    }

    match resolve_default_config_path() {
        Some(path) if path.exists() => read_file_config(&path).map(Some),
        _ => Ok(None),
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let cfg: FileConfig = toml::from_str(raw).context("Invalid config syntax")?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["quote-radar"];
        argv.extend_from_slice(extra);
        argv.push("discover");
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str(
            r#"
concurrency = 8
db_path = "/var/lib/quote-radar/quotes.db"
"#,
        )
        .expect("partial config should parse");
        assert_eq!(cfg.concurrency, Some(8));
        assert_eq!(
            cfg.db_path,
            Some(PathBuf::from("/var/lib/quote-radar/quotes.db"))
        );
        assert!(cfg.ct_endpoint.is_none());
    }

    #[test]
    fn test_parse_config_all_fields() {
        let cfg = parse_config_str(
            r#"
db_path = "q.db"
concurrency = 3
discovery_limit = 50
max_sites = 12
page_timeout_secs = 20
discovery_timeout_secs = 45
ct_endpoint = "https://ct.example.test/"
lookback_hours = 48
dns_probe_count = 40
"#,
        )
        .expect("full config should parse");
        assert_eq!(cfg.discovery_limit, Some(50));
        assert_eq!(cfg.max_sites, Some(12));
        assert_eq!(cfg.page_timeout_secs, Some(20));
        assert_eq!(cfg.discovery_timeout_secs, Some(45));
        assert_eq!(cfg.ct_endpoint.as_deref(), Some("https://ct.example.test/"));
        assert_eq!(cfg.lookback_hours, Some(48));
        assert_eq!(cfg.dns_probe_count, Some(40));
    }

    #[test]
    fn test_parse_config_supports_comments() {
        let cfg = parse_config_str(
            r#"
# crawl settings
concurrency = 4 # workers
"#,
        )
        .expect("config with comments should parse");
        assert_eq!(cfg.concurrency, Some(4));
    }

    #[test]
    fn test_parse_config_rejects_invalid_concurrency() {
        let err = parse_config_str("concurrency = 0").expect_err("invalid concurrency expected");
        assert!(
            err.to_string().contains("concurrency"),
            "expected concurrency validation error"
        );
    }

    #[test]
    fn test_parse_config_rejects_negative_numbers() {
        let err = parse_config_str("max_sites = -1").expect_err("negative value expected to fail");
        assert!(format!("{err:#}").contains("max_sites"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_timeout_value() {
        let err =
            parse_config_str("page_timeout_secs = 0").expect_err("invalid timeout expected");
        assert!(err.to_string().contains("page_timeout_secs"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_lookback() {
        let err = parse_config_str("lookback_hours = 721").expect_err("lookback above range");
        assert!(err.to_string().contains("lookback_hours"));
    }

    #[test]
    fn test_parse_config_rejects_non_http_endpoint() {
        let err = parse_config_str(r#"ct_endpoint = "ftp://ct.example.test/""#)
            .expect_err("non-http endpoint expected to fail");
        assert!(err.to_string().contains("ct_endpoint"));

        let err = parse_config_str(r#"ct_endpoint = "crt.sh""#)
            .expect_err("relative endpoint expected to fail");
        assert!(err.to_string().contains("ct_endpoint"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        let err = parse_config_str("unknown_key = 123").expect_err("unknown key error expected");
        let message = format!("{err:#}");
        assert!(message.contains("unknown field"), "got: {message}");
        assert!(message.contains("unknown_key"), "got: {message}");
    }

    #[test]
    fn test_parse_config_rejects_wrong_type() {
        let err = parse_config_str(r#"concurrency = "four""#).expect_err("type error expected");
        assert!(format!("{err:#}").contains("concurrency"));
    }

    #[test]
    fn test_read_file_config_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "concurrency = 200").unwrap();

        let err = read_file_config(&path).expect_err("out of range expected");
        let message = format!("{err:#}");
        assert!(message.contains("config.toml"), "got: {message}");
        assert!(message.contains("concurrency"), "got: {message}");
    }

    #[test]
    fn test_load_file_config_explicit_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(load_file_config(Some(&missing)).is_err());
    }

    #[test]
    fn test_load_file_config_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_sites = 3\n").unwrap();

        let cfg = load_file_config(Some(&path)).unwrap().unwrap();
        assert_eq!(cfg.max_sites, Some(3));
    }

    #[test]
    fn test_settings_defaults_without_file() {
        let settings = Settings::resolve(&args(&[]), None);
        assert_eq!(settings.db_path, PathBuf::from("quotes.db"));
        assert_eq!(settings.page_timeout_secs, 15);
        assert_eq!(settings.crawl, CrawlConfig::default());
        assert_eq!(settings.discovery, DiscoveryConfig::default());
    }

    #[test]
    fn test_settings_file_overrides_defaults() {
        let file = FileConfig {
            db_path: Some(PathBuf::from("file.db")),
            concurrency: Some(7),
            max_sites: Some(4),
            lookback_hours: Some(6),
            ..FileConfig::default()
        };
        let settings = Settings::resolve(&args(&[]), Some(&file));
        assert_eq!(settings.db_path, PathBuf::from("file.db"));
        assert_eq!(settings.crawl.concurrency, 7);
        assert_eq!(settings.crawl.max_sites, 4);
        assert_eq!(settings.discovery.lookback, Duration::from_secs(6 * 3600));
    }

    #[test]
    fn test_settings_cli_overrides_file() {
        let file = FileConfig {
            db_path: Some(PathBuf::from("file.db")),
            concurrency: Some(7),
            ..FileConfig::default()
        };
        let settings =
            Settings::resolve(&args(&["--db", "cli.db", "-c", "2"]), Some(&file));
        assert_eq!(settings.db_path, PathBuf::from("cli.db"));
        assert_eq!(settings.crawl.concurrency, 2);
    }
}
