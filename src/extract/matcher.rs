//! Independent quote matchers, one per textual pattern.
//!
//! Each matcher scans flattened page text and returns the raw spans it
//! recognizes. Matchers know nothing about quality filtering or priority;
//! the [`QuoteExtractor`](super::QuoteExtractor) owns both.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Text enclosed in straight double quotes.
#[allow(clippy::expect_used)]
static DOUBLE_QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([^"]{20,200})""#).expect("double-quote regex is valid") // Static pattern, safe to panic
});

/// Text enclosed in a low-9 / high-6 pair, with the straight quote accepted as closer.
#[allow(clippy::expect_used)]
static LOW_HIGH_QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"„([^“”"]{20,200})[“”"]"#).expect("low/high quote regex is valid") // Static pattern, safe to panic
});

/// Text enclosed in straight single quotes.
#[allow(clippy::expect_used)]
static SINGLE_QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'([^']{20,200})'").expect("single-quote regex is valid") // Static pattern, safe to panic
});

/// A capitalized sentence following the end of a previous one.
#[allow(clippy::expect_used)]
static SENTENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[.!?]\s+([A-Z][^.!?]{20,200}[.!?])").expect("sentence regex is valid") // Static pattern, safe to panic
});

/// The textual pattern a quote candidate was recognized by.
///
/// Declaration order is extraction priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QuotePattern {
    /// `"…"`
    DoubleQuoted,
    /// `„…“`
    LowHighQuoted,
    /// `'…'`
    SingleQuoted,
    /// A free-standing sentence.
    Sentence,
}

impl QuotePattern {
    /// All patterns, highest priority first.
    pub const ALL: [Self; 4] = [
        Self::DoubleQuoted,
        Self::LowHighQuoted,
        Self::SingleQuoted,
        Self::Sentence,
    ];

    /// Returns the stable label used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DoubleQuoted => "double_quoted",
            Self::LowHighQuoted => "low_high_quoted",
            Self::SingleQuoted => "single_quoted",
            Self::Sentence => "sentence",
        }
    }
}

impl fmt::Display for QuotePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single quote-recognition strategy.
pub trait QuoteMatcher: Send + Sync {
    /// Returns the pattern this matcher recognizes.
    fn pattern(&self) -> QuotePattern;

    /// Returns every span of `text` this matcher recognizes, in text order,
    /// without trimming or filtering.
    fn matches<'t>(&self, text: &'t str) -> Vec<&'t str>;
}

/// Matcher backed by a regex whose first capture group is the quote body.
#[derive(Debug, Clone, Copy)]
pub struct RegexMatcher {
    pattern: QuotePattern,
    regex: &'static Regex,
}

impl RegexMatcher {
    /// Returns the built-in matcher for `pattern`.
    #[must_use]
    pub fn for_pattern(pattern: QuotePattern) -> Self {
        let regex: &'static Regex = match pattern {
            QuotePattern::DoubleQuoted => &DOUBLE_QUOTED,
            QuotePattern::LowHighQuoted => &LOW_HIGH_QUOTED,
            QuotePattern::SingleQuoted => &SINGLE_QUOTED,
            QuotePattern::Sentence => &SENTENCE,
        };
        Self { pattern, regex }
    }
}

impl QuoteMatcher for RegexMatcher {
    fn pattern(&self) -> QuotePattern {
        self.pattern
    }

    fn matches<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .collect()
    }
}

/// Builds the built-in matchers in priority order.
#[must_use]
pub fn default_matchers() -> Vec<Box<dyn QuoteMatcher>> {
    QuotePattern::ALL
        .into_iter()
        .map(|pattern| Box::new(RegexMatcher::for_pattern(pattern)) as Box<dyn QuoteMatcher>)
        .collect()
}
