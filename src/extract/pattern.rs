//! Regular-expression extraction over raw markup.
//!
//! The activity site renders identifiers inside link query strings and its
//! title as a bare `<h2>`; both are pulled straight from the response text
//! before any tree parsing happens.

use once_cell::sync::Lazy;
use regex::Regex;

/// A regex whose first capture group is the extracted value.
#[derive(Debug)]
pub struct PatternExtractor {
    name: &'static str,
    regex: Regex,
}

impl PatternExtractor {
    fn new(name: &'static str, pattern: &str) -> Self {
        let regex = Regex::new(pattern).unwrap_or_else(|e| panic!("invalid pattern {name}: {e}"));
        Self { name, regex }
    }

    /// Short label used in error messages.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Capture of the first match, if any.
    pub fn first<'h>(&self, haystack: &'h str) -> Option<&'h str> {
        self.regex
            .captures(haystack)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Captures of every match, in document order.
    pub fn all<'h>(&self, haystack: &'h str) -> Vec<&'h str> {
        self.regex
            .captures_iter(haystack)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .collect()
    }
}

/// `Sno=<token>` inside an activity event link.
pub static SNO: Lazy<PatternExtractor> =
    Lazy::new(|| PatternExtractor::new("Sno=", r#"Sno=([^"&'\s>]+)"#));

/// Contents of the first bare `<h2>` on a single line.
pub static H2_TITLE: Lazy<PatternExtractor> =
    Lazy::new(|| PatternExtractor::new("<h2>", r"<h2>(.*?)</h2>"));
