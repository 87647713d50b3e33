//! Field extraction from fetched pages.
//!
//! Two composable paths:
//! - [`article`]: tree-based lookups over a parsed `scraper::Html` document
//! - [`pattern`]: regular-expression scans over the raw markup, used where the
//!   site's HTML is easier to match as text than to walk as a tree

pub mod article;
pub mod pattern;

use scraper::{ElementRef, Selector};

/// Compile a selector that is known to be valid at build time.
pub(crate) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e}"))
}

/// Whole-subtree text of an element, trimmed.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
