//! Constants for the fetch module (timeouts, body limits).

/// Connect timeout shared by page and discovery clients.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Total request budget for a single page fetch.
pub const PAGE_TIMEOUT_SECS: u64 = 15;

/// Total request budget for a certificate-transparency query.
pub const DISCOVERY_TIMEOUT_SECS: u64 = 30;

/// Page bodies are cut off after this many bytes (5 MiB).
pub const MAX_PAGE_BYTES: usize = 5 * 1024 * 1024;

/// Certificate-transparency responses larger than this are rejected (32 MiB).
pub const MAX_DISCOVERY_BYTES: usize = 32 * 1024 * 1024;
