//! Shared User-Agent strings for page and discovery HTTP clients.

/// Browser User-Agent sent when fetching crawl targets.
///
/// Many freshly deployed sites sit behind bot filters that reject unknown
/// agents outright, so page fetches present as a desktop browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// User-Agent for certificate-transparency queries (identifies the tool).
#[must_use]
pub(crate) fn discovery_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("quote-radar/{version} (site-discovery)")
}
