//! Candidate domain validation.
//!
//! Discovery strategies produce raw hostname strings of varying quality
//! (certificate subject names, synthesized probe names). [`is_valid_domain`]
//! is the plausibility check every candidate passes through, and [`Domain`]
//! is the validated form handed to the crawler.

use std::fmt;

/// Minimum accepted candidate length, in characters.
const MIN_DOMAIN_LENGTH: usize = 4;

/// Characters that never appear in a bare hostname.
const FORBIDDEN_CHARS: [char; 5] = ['/', '\\', ' ', '\n', '\t'];

/// Prefix marking a wildcard certificate entry such as `*.example.com`.
const WILDCARD_PREFIX: &str = "*.";

/// Returns true if `candidate` looks like a plausible domain name.
///
/// Rules: at least four characters, at least one `.`, and none of
/// `/`, `\`, space, newline or tab. Malformed input simply returns false.
///
/// # Examples
///
/// ```
/// use quote_radar_core::is_valid_domain;
///
/// assert!(is_valid_domain("ab.co"));
/// assert!(!is_valid_domain("abc"));
/// assert!(!is_valid_domain("example.com/path"));
/// ```
#[must_use]
pub fn is_valid_domain(candidate: &str) -> bool {
    if candidate.chars().count() < MIN_DOMAIN_LENGTH {
        return false;
    }
    if !candidate.contains('.') {
        return false;
    }
    !candidate.contains(FORBIDDEN_CHARS)
}

/// A validated hostname produced by discovery.
///
/// The only way to build one is [`Domain::parse`], so every value is
/// trimmed, lowercased, non-wildcard and passes [`is_valid_domain`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Domain(String);

impl Domain {
    /// Normalizes and validates a raw candidate.
    ///
    /// Returns `None` for wildcard entries and anything rejected by
    /// [`is_valid_domain`].
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.starts_with(WILDCARD_PREFIX) {
            return None;
        }
        is_valid_domain(&normalized).then_some(Self(normalized))
    }

    /// Returns the hostname as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the domain, returning the inner hostname.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
