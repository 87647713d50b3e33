//! Hot news and honor-roll driver.
//!
//! Both content types walk a numbered listing and extract every linked article
//! with the same rules; they differ only in their listing URL.

use crate::config::ContentTypeConfig;
use crate::error::ScrapeError;
use crate::extract::article::{NEWS_RULES, extract_article};
use crate::fetch::FetchPage;
use crate::models::{Harvest, Record, RecordCollector};
use crate::paginate::discover_item_urls;
use crate::utils::truncate_for_log;
use tracing::{info, instrument};

use super::RunOptions;

/// Fetch and extract every article reachable from the listing, in listing order.
#[instrument(level = "info", skip_all, fields(content_type = %config.content_type))]
pub async fn scrape<F: FetchPage>(
    fetcher: &F,
    config: &ContentTypeConfig,
    options: &RunOptions,
) -> Result<Harvest, ScrapeError> {
    let urls = discover_item_urls(fetcher, config, options.max_pages).await?;
    let total = urls.len();

    let mut collector = RecordCollector::new(options.failure_policy);
    for (i, url) in urls.iter().enumerate() {
        let outcome = fetch_article(fetcher, url).await;
        if let Ok(record) = &outcome {
            info!(
                index = i + 1,
                total,
                date = record.date.as_deref().unwrap_or_default(),
                title = %truncate_for_log(&record.title, 120),
                "Article"
            );
        }
        collector.absorb(url, outcome)?;
    }
    Ok(collector.finish())
}

async fn fetch_article<F: FetchPage>(fetcher: &F, url: &str) -> Result<Record, ScrapeError> {
    let html = fetcher.fetch(url).await?;
    extract_article(&html, url, &NEWS_RULES)
}
