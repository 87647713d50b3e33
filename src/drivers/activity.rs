//! Activity driver.
//!
//! The activity site has no pagination. Its index page links every event as
//! `/Activity/Home/Event?Sno=<id>`; the identifiers are scraped from the raw
//! markup, deduplicated, and each event page is fetched directly.

use crate::config::SNO_PLACEHOLDER;
use crate::error::ScrapeError;
use crate::extract::element_text;
use crate::extract::pattern::{H2_TITLE, SNO};
use crate::extract::selector;
use crate::fetch::FetchPage;
use crate::models::{Harvest, Record, RecordCollector, Sno};
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};

use super::RunOptions;

const EVENT_BODY: &str = "div.blog-main";
static EVENT_BODY_SEL: Lazy<Selector> = Lazy::new(|| selector(EVENT_BODY));

/// Distinct identifiers in first-seen order, capped at `max_items`.
pub fn collect_snos(index_html: &str, max_items: Option<usize>) -> Vec<Sno> {
    SNO.all(index_html)
        .into_iter()
        .unique()
        .take(max_items.unwrap_or(usize::MAX))
        .map(|token| Sno(token.to_string()))
        .collect()
}

/// Extract one event page.
///
/// The title is the first bare `<h2>` found by scanning the raw response; the
/// body comes from the `div.blog-main` element of the parsed tree.
pub fn extract_event(raw: &str, url: &str) -> Result<Record, ScrapeError> {
    let title = H2_TITLE
        .first(raw)
        .map(|t| t.trim().to_string())
        .ok_or_else(|| ScrapeError::parse(url, H2_TITLE.name()))?;

    let document = Html::parse_document(raw);
    let content = document
        .select(&EVENT_BODY_SEL)
        .next()
        .map(element_text)
        .ok_or_else(|| ScrapeError::parse(url, EVENT_BODY))?;

    Ok(Record {
        title,
        url: url.to_string(),
        date: None,
        content,
    })
}

#[instrument(level = "info", skip(fetcher, options))]
pub async fn scrape<F: FetchPage>(
    fetcher: &F,
    index_url: &str,
    event_url: &str,
    options: &RunOptions,
) -> Result<Harvest, ScrapeError> {
    let index_html = fetcher.fetch(index_url).await?;
    let snos = collect_snos(&index_html, options.max_items);
    info!(count = snos.len(), "Collected activity identifiers");

    let mut collector = RecordCollector::new(options.failure_policy);
    for sno in &snos {
        let url = event_url.replace(SNO_PLACEHOLDER, &sno.0);
        debug!(%sno, %url, "Fetching activity");
        let outcome = match fetcher.fetch(&url).await {
            Ok(raw) => extract_event(&raw, &url),
            Err(e) => Err(e),
        };
        if let Ok(record) = &outcome {
            info!(title = %record.title, "Activity");
        }
        collector.absorb(&url, outcome)?;
    }
    Ok(collector.finish())
}
