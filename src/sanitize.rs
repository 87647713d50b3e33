//! Removal of leftover HTML character references from extracted text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Numeric (`&#128266;`) or named (`&nbsp;`) character reference.
static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(?:#\d+|\w+);").expect("entity pattern compiles"));

/// Strip every numeric and named character reference, leaving all other text untouched.
///
/// Removing one reference can splice its neighbours into a new one
/// (`&am&#1;p;` becomes `&amp;`), so the pass repeats until nothing matches.
/// That makes the function idempotent.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(sanitize("&#128266;活動公告&nbsp;"), "活動公告");
/// ```
pub fn sanitize(text: &str) -> String {
    let mut current = ENTITY.replace_all(text, "").into_owned();
    while ENTITY.is_match(&current) {
        current = ENTITY.replace_all(&current, "").into_owned();
    }
    current
}
