//! Trigger detection for automatic fact-checking
//!
//! A message is flagged when it contains a configured keyword or matches
//! one of the common misinformation phrasing patterns.

use once_cell::sync::Lazy;
use regex::Regex;

/// Phrasing patterns that often accompany misinformation.
static MISINFO_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\b(studies? show|research proves|scientists say)\b",
        r"\b(breaking|urgent|exclusive)\b.*\b(news|report)\b",
        r"\b(they don'?t want you to know|hidden truth|cover[- ]?up)\b",
        r"\b(miracle cure|secret remedy|doctors hate)\b",
        r"\b\d+% of (people|doctors|scientists)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid misinformation pattern"))
    .collect()
});

/// Decides whether a message warrants an automatic fact-check.
#[derive(Debug, Clone)]
pub struct TriggerScanner {
    keywords: Vec<String>,
    min_length: usize,
    max_length: usize,
}

impl TriggerScanner {
    /// Build a scanner from configured keywords and message length bounds.
    pub fn new(keywords: &[String], min_length: usize, max_length: usize) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            min_length,
            max_length,
        }
    }

    /// True when the message should be automatically fact-checked.
    pub fn should_check(&self, content: &str) -> bool {
        let len = content.chars().count();
        if len < self.min_length || len > self.max_length {
            return false;
        }

        let lower = content.to_lowercase();

        if self.keywords.iter().any(|k| lower.contains(k.as_str())) {
            return true;
        }

        MISINFO_PATTERNS.iter().any(|p| p.is_match(&lower))
    }

    /// The first keyword found in the message, if any.
    pub fn matched_keyword(&self, content: &str) -> Option<&str> {
        let lower = content.to_lowercase();
        self.keywords
            .iter()
            .find(|k| lower.contains(k.as_str()))
            .map(|k| k.as_str())
    }

    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }
}
