//! "About us" driver.
//!
//! The about section is not a listing: one directory page carries a
//! right-hand dropdown menu (`ul.dropmenu-right`) whose links point at the
//! individual pages. Only site-local links under the configured prefix are
//! followed; anything else (external sites, other sub-systems) is skipped.
//!
//! Each page's title is its breadcrumb trail with the shared
//! "首頁 > 關於我們" lead removed.

use crate::error::ScrapeError;
use crate::extract::{element_text, selector};
use crate::fetch::FetchPage;
use crate::models::{Harvest, Record, RecordCollector};
use crate::sanitize::sanitize;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};

use super::RunOptions;

const MENU: &str = "ul.dropmenu-right";
const CONTENT: &str = "div.mcont";
const BREADCRUMB: &str = "ol.breadcrumb";

static MENU_SEL: Lazy<Selector> = Lazy::new(|| selector(MENU));
static MENU_ITEM_SEL: Lazy<Selector> = Lazy::new(|| selector("li"));
static ANCHOR_SEL: Lazy<Selector> = Lazy::new(|| selector("a"));
static CONTENT_SEL: Lazy<Selector> = Lazy::new(|| selector(CONTENT));
static BREADCRUMB_SEL: Lazy<Selector> = Lazy::new(|| selector(BREADCRUMB));

/// Where the about menu lives and how its pages are recognised.
#[derive(Debug, Clone, Copy)]
pub struct AboutMenu<'a> {
    pub directory_url: &'a str,
    /// Prepended to site-local hrefs, without a trailing slash.
    pub site_root: &'a str,
    pub link_prefix: &'a str,
    pub breadcrumb_prefix: &'a str,
}

/// `href` of the first anchor in every menu item, in document order.
pub fn menu_links(html: &str, url: &str) -> Result<Vec<String>, ScrapeError> {
    let document = Html::parse_document(html);
    let menu = document
        .select(&MENU_SEL)
        .next()
        .ok_or_else(|| ScrapeError::parse(url, MENU))?;

    let mut links = Vec::new();
    for item in menu.select(&MENU_ITEM_SEL) {
        match item
            .select(&ANCHOR_SEL)
            .next()
            .and_then(|a| a.value().attr("href"))
        {
            Some(href) => links.push(href.to_string()),
            None => debug!(text = %element_text(item), "Menu item without link"),
        }
    }
    Ok(links)
}

/// Breadcrumb trail as one line, with the shared leading trail removed.
///
/// Each line is trimmed before joining, so indentation between items does not
/// hide the prefix. Only a leading prefix is stripped.
pub fn clean_breadcrumb(raw: &str, prefix: &str) -> String {
    let joined: String = sanitize(raw).lines().map(str::trim).collect();
    joined
        .strip_prefix(prefix)
        .unwrap_or(joined.as_str())
        .trim()
        .to_string()
}

/// Text of every breadcrumb item, one per line; the whole trail if it has no items.
fn breadcrumb_trail(crumb: ElementRef<'_>) -> String {
    let items: Vec<String> = crumb
        .select(&MENU_ITEM_SEL)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect();
    if items.is_empty() {
        element_text(crumb)
    } else {
        items.join("\n")
    }
}

/// Extract one about page: breadcrumb as title, whole container text as content.
pub fn extract_about_page(html: &str, url: &str, breadcrumb_prefix: &str) -> Result<Record, ScrapeError> {
    let document = Html::parse_document(html);
    let content = document
        .select(&CONTENT_SEL)
        .next()
        .map(element_text)
        .ok_or_else(|| ScrapeError::parse(url, CONTENT))?;
    let breadcrumb = document
        .select(&BREADCRUMB_SEL)
        .next()
        .map(breadcrumb_trail)
        .ok_or_else(|| ScrapeError::parse(url, BREADCRUMB))?;

    Ok(Record {
        title: clean_breadcrumb(&breadcrumb, breadcrumb_prefix),
        url: url.to_string(),
        date: None,
        content,
    })
}

#[instrument(level = "info", skip_all, fields(directory = %menu.directory_url))]
pub async fn scrape<F: FetchPage>(
    fetcher: &F,
    menu: &AboutMenu<'_>,
    options: &RunOptions,
) -> Result<Harvest, ScrapeError> {
    let directory = fetcher.fetch(menu.directory_url).await?;
    let links = menu_links(&directory, menu.directory_url)?;
    info!(count = links.len(), "Collected about menu links");

    let mut collector = RecordCollector::new(options.failure_policy);
    for href in &links {
        if !href.starts_with(menu.link_prefix) {
            // Off-site and non-page links are not scraped.
            debug!(%href, "Skipping menu link outside the site page tree");
            continue;
        }
        let url = format!("{}{}", menu.site_root, href);
        let outcome = match fetcher.fetch(&url).await {
            Ok(html) => extract_about_page(&html, &url, menu.breadcrumb_prefix),
            Err(e) => Err(e),
        };
        if let Ok(record) = &outcome {
            info!(title = %record.title, "About page");
        }
        collector.absorb(&url, outcome)?;
    }
    Ok(collector.finish())
}
