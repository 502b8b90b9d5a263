//! Quote quality heuristic.

/// Boilerplate vocabulary that marks navigation, legal or error text.
///
/// Matched as case-insensitive substrings, so `"Cookies"` and `"headers"`
/// are caught too.
pub const NEGATIVE_INDICATORS: [&str; 15] = [
    "cookie",
    "privacy",
    "terms",
    "conditions",
    "javascript",
    "error",
    "404",
    "not found",
    "loading",
    "click here",
    "menu",
    "navigation",
    "footer",
    "header",
    "sidebar",
];

/// Minimum number of whitespace-separated words in an accepted quote.
pub const MIN_QUOTE_WORDS: usize = 5;

/// Returns the number of whitespace-separated words in `text`.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Returns true if `quote` reads like content rather than page chrome.
///
/// Rejects anything containing a [`NEGATIVE_INDICATORS`] term and anything
/// shorter than [`MIN_QUOTE_WORDS`] words.
///
/// # Examples
///
/// ```
/// use quote_radar_core::extract::is_good_quote;
///
/// assert!(is_good_quote("Simplicity is the soul of efficiency"));
/// assert!(!is_good_quote("Our Cookie policy applies to everyone"));
/// ```
#[must_use]
pub fn is_good_quote(quote: &str) -> bool {
    let lowered = quote.to_lowercase();
    if NEGATIVE_INDICATORS
        .iter()
        .any(|indicator| lowered.contains(indicator))
    {
        return false;
    }
    word_count(quote) >= MIN_QUOTE_WORDS
}
