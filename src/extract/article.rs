//! Tree-based extraction of news-style article pages.
//!
//! Hot news and honor-roll items share one layout:
//!
//! ```text
//! <h2 class="hdline">title</h2>
//! <div class="mcont">
//!   <span class="ptinfoproperty_date"><span>2024-03-01</span></span>
//!   <p>paragraph</p><p>paragraph</p>
//! </div>
//! ```

use super::{element_text, selector};
use crate::error::ScrapeError;
use crate::models::Record;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, instrument};

/// Selectors that locate each field of an article.
#[derive(Debug)]
pub struct ExtractionRules {
    pub title: (&'static str, Selector),
    pub content: (&'static str, Selector),
    /// Optional wrapper around the date.
    pub date_outer: Selector,
    /// Searched inside `date_outer` for the date text.
    pub date_inner: Selector,
    pub paragraph: Selector,
}

impl ExtractionRules {
    fn new(
        title: &'static str,
        content: &'static str,
        date_outer: &'static str,
        date_inner: &'static str,
        paragraph: &'static str,
    ) -> Self {
        Self {
            title: (title, selector(title)),
            content: (content, selector(content)),
            date_outer: selector(date_outer),
            date_inner: selector(date_inner),
            paragraph: selector(paragraph),
        }
    }
}

/// Rules for the hot news and honors listings.
pub static NEWS_RULES: Lazy<ExtractionRules> = Lazy::new(|| {
    ExtractionRules::new("h2.hdline", "div.mcont", "span.ptinfoproperty_date", "span", "p")
});

/// Extract a [`Record`] from an article page.
///
/// Title and content container are required. A missing date wrapper yields an
/// empty date. Paragraph texts are trimmed and concatenated in document order
/// with no separator. `url` is passed through untouched.
#[instrument(level = "debug", skip(html, rules))]
pub fn extract_article(html: &str, url: &str, rules: &ExtractionRules) -> Result<Record, ScrapeError> {
    let document = Html::parse_document(html);

    let (title_css, title_sel) = &rules.title;
    let title = document
        .select(title_sel)
        .next()
        .map(element_text)
        .ok_or_else(|| ScrapeError::parse(url, *title_css))?;

    let (content_css, content_sel) = &rules.content;
    let container = document
        .select(content_sel)
        .next()
        .ok_or_else(|| ScrapeError::parse(url, *content_css))?;

    let date = container
        .select(&rules.date_outer)
        .next()
        .map(|outer| {
            outer
                .select(&rules.date_inner)
                .find(|inner| inner.id() != outer.id())
                .map(element_text)
                .unwrap_or_default()
        })
        .unwrap_or_default();

    let content: String = container.select(&rules.paragraph).map(element_text).collect();

    debug!(%title, %date, bytes = content.len(), "Extracted article");
    Ok(Record {
        title,
        url: url.to_string(),
        date: Some(date),
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const URL: &str = "https://www.nkust.edu.tw/p/406-1000-1.php";

    #[test]
    fn test_full_article() {
        let html = r#"<html><body>
            <h2 class="hdline"> 本校榮獲教學卓越獎 </h2>
            <div class="mcont">
              <span class="ptinfoproperty_date"><span>2024-03-01</span></span>
              <p> 第一段。 </p>
              <div><p>第二段。</p></div>
              <p>Third.</p>
            </div>
        </body></html>"#;
        let record = extract_article(html, URL, &NEWS_RULES).unwrap();
        assert_eq!(
            record,
            Record {
                title: "本校榮獲教學卓越獎".to_string(),
                url: URL.to_string(),
                date: Some("2024-03-01".to_string()),
                content: "第一段。第二段。Third.".to_string(),
            }
        );
    }

    #[test]
    fn test_no_paragraphs_and_no_date() {
        let html = r#"<h2 class="hdline">Heading</h2><div class="mcont">loose text</div>"#;
        let record = extract_article(html, URL, &NEWS_RULES).unwrap();
        assert_eq!(record.title, "Heading");
        assert_eq!(record.date.as_deref(), Some(""));
        assert_eq!(record.content, "");
        assert_eq!(record.url, URL);
    }

    #[test]
    fn test_date_wrapper_without_inner_span() {
        let html = r#"<h2 class="hdline">T</h2><div class="mcont"><span class="ptinfoproperty_date">2024</span><p>x</p></div>"#;
        let record = extract_article(html, URL, &NEWS_RULES).unwrap();
        assert_eq!(record.date.as_deref(), Some(""));
    }

    #[test]
    fn test_missing_title_is_parse_error() {
        let html = r#"<h2>Not the headline</h2><div class="mcont"><p>x</p></div>"#;
        let err = extract_article(html, URL, &NEWS_RULES).unwrap_err();
        assert!(matches!(err, ScrapeError::Parse { ref selector, .. } if selector == "h2.hdline"));
    }

    #[test]
    fn test_missing_container_is_parse_error() {
        let html = r#"<h2 class="hdline">T</h2><div class="content"><p>x</p></div>"#;
        let err = extract_article(html, URL, &NEWS_RULES).unwrap_err();
        assert!(matches!(err, ScrapeError::Parse { ref selector, .. } if selector == "div.mcont"));
    }
}
