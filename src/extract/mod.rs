//! Heuristic quote extraction from arbitrary pages.
//!
//! Extraction is pattern based and best effort:
//!
//! 1. The page is parsed as HTML and reduced to visible text
//!    (`<script>` and `<style>` dropped).
//! 2. Matchers run in priority order: double quotes, low/high quotes,
//!    single quotes, then free-standing sentences.
//! 3. Each span is trimmed and kept only if it is longer than
//!    [`MIN_QUOTE_CHARS`] and passes [`is_good_quote`].
//! 4. The first matcher that produces an accepted quote ends the search;
//!    at most [`MAX_CANDIDATES`] quotes are returned.
//!
//! # Example
//!
//! ```
//! use quote_radar_core::extract::{QuoteExtractor, QuotePattern};
//!
//! let page = br#"<p>As they say, "the river remembers every stone it carried".</p>"#;
//! let quotes = QuoteExtractor::new().extract(page);
//! assert_eq!(quotes.len(), 1);
//! assert_eq!(quotes[0].text, "the river remembers every stone it carried");
//! assert_eq!(quotes[0].pattern, QuotePattern::DoubleQuoted);
//! ```

mod matcher;
mod quality;
mod text;

pub use matcher::{QuoteMatcher, QuotePattern, RegexMatcher, default_matchers};
pub use quality::{MIN_QUOTE_WORDS, NEGATIVE_INDICATORS, is_good_quote, word_count};
pub use text::visible_text;

use tracing::{debug, instrument, trace};

/// Maximum number of candidates returned for one page.
pub const MAX_CANDIDATES: usize = 5;

/// Quotes must be strictly longer than this many characters after trimming.
pub const MIN_QUOTE_CHARS: usize = 20;

/// A quote that passed pattern matching and the quality filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteCandidate {
    /// Trimmed quote text.
    pub text: String,
    /// The pattern that recognized this quote.
    pub pattern: QuotePattern,
    /// Whitespace-separated word count of `text`.
    pub word_count: usize,
}

impl QuoteCandidate {
    fn new(text: &str, pattern: QuotePattern) -> Self {
        Self {
            text: text.to_string(),
            pattern,
            word_count: word_count(text),
        }
    }

    /// Returns the quote length in characters.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Runs a prioritized list of [`QuoteMatcher`]s over page text.
pub struct QuoteExtractor {
    matchers: Vec<Box<dyn QuoteMatcher>>,
}

impl Default for QuoteExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QuoteExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let patterns: Vec<_> = self.matchers.iter().map(|m| m.pattern()).collect();
        f.debug_struct("QuoteExtractor")
            .field("matchers", &patterns)
            .finish()
    }
}

impl QuoteExtractor {
    /// Creates an extractor with the built-in matchers.
    #[must_use]
    pub fn new() -> Self {
        Self::with_matchers(default_matchers())
    }

    /// Creates an extractor with custom matchers, tried in the given order.
    #[must_use]
    pub fn with_matchers(matchers: Vec<Box<dyn QuoteMatcher>>) -> Self {
        Self { matchers }
    }

    /// Extracts up to [`MAX_CANDIDATES`] quotes from a fetched page body.
    ///
    /// Never fails: unparseable input simply yields no candidates.
    #[must_use]
    #[instrument(level = "debug", skip(self, page), fields(page_bytes = page.len()))]
    pub fn extract(&self, page: &[u8]) -> Vec<QuoteCandidate> {
        let text = visible_text(page);
        self.extract_from_text(&text)
    }

    /// Extracts quotes from already-flattened text.
    #[must_use]
    pub fn extract_from_text(&self, text: &str) -> Vec<QuoteCandidate> {
        let mut quotes = Vec::new();

        for matcher in &self.matchers {
            for span in matcher.matches(text) {
                let quote = span.trim();
                if quote.chars().count() > MIN_QUOTE_CHARS && is_good_quote(quote) {
                    quotes.push(QuoteCandidate::new(quote, matcher.pattern()));
                    if quotes.len() >= MAX_CANDIDATES {
                        break;
                    }
                } else {
                    trace!(pattern = %matcher.pattern(), quote, "rejected span");
                }
            }

            if !quotes.is_empty() {
                debug!(
                    pattern = %matcher.pattern(),
                    count = quotes.len(),
                    "quotes extracted"
                );
                break;
            }
        }

        quotes
    }
}
