//! Listing pagination: page-count discovery and item-link collection.
//!
//! A listing page carries a page indicator (`<span class="pg-txt">`) whose
//! first number is the total page count, and one `div.listBS` card per item
//! whose `div.mtitle` holds the item link.

use crate::config::ContentTypeConfig;
use crate::error::ScrapeError;
use crate::extract::selector;
use crate::fetch::FetchPage;
use crate::models::ListingPage;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

const PAGE_INDICATOR: &str = "span.pg-txt";
const CARD: &str = "div.listBS";
const CARD_LINK: &str = "div.mtitle a[href]";

static PAGE_INDICATOR_SEL: Lazy<Selector> = Lazy::new(|| selector(PAGE_INDICATOR));
static CARD_SEL: Lazy<Selector> = Lazy::new(|| selector(CARD));
static CARD_LINK_SEL: Lazy<Selector> = Lazy::new(|| selector(CARD_LINK));
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("digit pattern compiles"));

/// How many listing pages to walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageLimit {
    /// Read the total from page 1's indicator.
    #[default]
    Auto,
    /// Walk exactly this many pages without looking at the indicator.
    Pages(u32),
}

impl From<Option<u32>> for PageLimit {
    fn from(value: Option<u32>) -> Self {
        value.map_or(PageLimit::Auto, PageLimit::Pages)
    }
}

/// Total page count announced by a listing page.
pub fn page_count(page: &ListingPage) -> Result<u32, ScrapeError> {
    let document = Html::parse_document(&page.html);
    let indicator = document
        .select(&PAGE_INDICATOR_SEL)
        .next()
        .ok_or_else(|| ScrapeError::parse(&page.url, PAGE_INDICATOR))?;
    let text = indicator.text().collect::<String>();
    DIGITS
        .find(&text)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .ok_or_else(|| ScrapeError::parse(&page.url, format!("{PAGE_INDICATOR} page number")))
}

/// Item links of every card on a listing page, resolved against the page URL.
pub fn card_links(page: &ListingPage) -> Result<Vec<String>, ScrapeError> {
    let base = Url::parse(&page.url).map_err(|source| ScrapeError::InvalidUrl {
        url: page.url.clone(),
        source,
    })?;
    let document = Html::parse_document(&page.html);

    let mut links = Vec::new();
    for card in document.select(&CARD_SEL) {
        let href = card
            .select(&CARD_LINK_SEL)
            .next()
            .and_then(|a| a.value().attr("href"))
            .ok_or_else(|| ScrapeError::parse(&page.url, format!("{CARD} {CARD_LINK}")))?;
        let resolved = base.join(href).map_err(|source| ScrapeError::InvalidUrl {
            url: href.to_string(),
            source,
        })?;
        links.push(resolved.to_string());
    }
    Ok(links)
}

async fn fetch_listing<F: FetchPage>(
    fetcher: &F,
    config: &ContentTypeConfig,
    index: u32,
) -> Result<ListingPage, ScrapeError> {
    let url = config.page_url(index);
    let html = fetcher.fetch(&url).await?;
    Ok(ListingPage { index, url, html })
}

/// Collect item URLs across listing pages, in page order then document order.
///
/// With [`PageLimit::Auto`] page 1 is fetched once, its indicator gives the
/// page count, and the same response is reused for its cards. A missing
/// indicator fails the whole listing. Duplicates are kept.
#[instrument(level = "info", skip(fetcher, config), fields(content_type = %config.content_type))]
pub async fn discover_item_urls<F: FetchPage>(
    fetcher: &F,
    config: &ContentTypeConfig,
    limit: PageLimit,
) -> Result<Vec<String>, ScrapeError> {
    let (last_page, mut cached_first) = match limit {
        PageLimit::Pages(n) => (n, None),
        PageLimit::Auto => {
            let first = fetch_listing(fetcher, config, 1).await?;
            let total = page_count(&first)?;
            info!(total, "Detected page count");
            (total, Some(first))
        }
    };

    let mut item_urls = Vec::new();
    for index in 1..=last_page {
        let page = match cached_first.take() {
            Some(first) if index == 1 => first,
            _ => fetch_listing(fetcher, config, index).await?,
        };
        let links = card_links(&page)?;
        info!(page = page.index, items = links.len(), "Listing page scanned");
        debug!(urls = ?links, "Listing links");
        item_urls.extend(links);
    }

    info!(count = item_urls.len(), pages = last_page, "Collected item URLs");
    Ok(item_urls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContentType, SiteConfig};
    use crate::fetch::testing::FakeSite;
    use pretty_assertions::assert_eq;

    fn listing(indicator: Option<&str>, hrefs: &[&str]) -> String {
        let cards: String = hrefs
            .iter()
            .map(|href| {
                format!(
                    r#"<div class="listBS"><div class="mtitle"><a href="{href}">item</a></div><div class="mdate">2024-01-01</div></div>"#
                )
            })
            .collect();
        let indicator = indicator
            .map(|text| format!(r#"<span class="pg-txt">{text}</span>"#))
            .unwrap_or_default();
        format!("<html><body><div class=\"mlist\">{cards}</div>{indicator}</body></html>")
    }

    fn hot_news() -> ContentTypeConfig {
        SiteConfig::default().content_type(ContentType::HotNews)
    }

    fn two_page_site() -> FakeSite {
        let config = hot_news();
        FakeSite::new()
            .page(
                &config.page_url(1),
                &listing(
                    Some("共 2 頁"),
                    &[
                        "https://www.nkust.edu.tw/p/406-1000-1.php",
                        "https://www.nkust.edu.tw/p/406-1000-2.php",
                        "/p/406-1000-3.php",
                    ],
                ),
            )
            .page(
                &config.page_url(2),
                &listing(
                    Some("共 2 頁"),
                    &[
                        "https://www.nkust.edu.tw/p/406-1000-4.php",
                        "https://www.nkust.edu.tw/p/406-1000-5.php",
                    ],
                ),
            )
    }

    fn expected() -> Vec<String> {
        (1..=5)
            .map(|i| format!("https://www.nkust.edu.tw/p/406-1000-{i}.php"))
            .collect()
    }

    #[tokio::test]
    async fn test_explicit_page_limit_walks_in_order() {
        let site = two_page_site();
        let urls = discover_item_urls(&site, &hot_news(), PageLimit::Pages(2))
            .await
            .unwrap();
        assert_eq!(urls, expected());
        assert_eq!(site.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_auto_detect_fetches_first_page_once() {
        let site = two_page_site();
        let config = hot_news();
        let urls = discover_item_urls(&site, &config, PageLimit::Auto).await.unwrap();
        assert_eq!(urls, expected());
        assert_eq!(site.hits(&config.page_url(1)), 1);
        assert_eq!(site.hits(&config.page_url(2)), 1);
    }

    #[tokio::test]
    async fn test_explicit_limit_caps_walk() {
        let site = two_page_site();
        let urls = discover_item_urls(&site, &hot_news(), PageLimit::Pages(1))
            .await
            .unwrap();
        assert_eq!(urls.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_indicator_is_fatal() {
        let config = hot_news();
        let site = FakeSite::new().page(
            &config.page_url(1),
            &listing(None, &["https://www.nkust.edu.tw/p/406-1000-1.php"]),
        );
        let err = discover_item_urls(&site, &config, PageLimit::Auto)
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Parse { ref selector, .. } if selector == PAGE_INDICATOR));
    }

    #[test]
    fn test_page_count_takes_first_number() {
        let page = ListingPage {
            index: 1,
            url: hot_news().page_url(1),
            html: listing(Some("共 37 頁, 每頁 10 筆"), &[]),
        };
        assert_eq!(page_count(&page).unwrap(), 37);
    }

    #[test]
    fn test_indicator_without_digits_is_fatal() {
        let page = ListingPage {
            index: 1,
            url: hot_news().page_url(1),
            html: listing(Some("no pages"), &[]),
        };
        assert!(matches!(page_count(&page), Err(ScrapeError::Parse { .. })));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let page = ListingPage {
            index: 1,
            url: hot_news().page_url(1),
            html: listing(Some("1"), &["/p/a.php", "/p/a.php"]),
        };
        assert_eq!(
            card_links(&page).unwrap(),
            vec![
                "https://www.nkust.edu.tw/p/a.php".to_string(),
                "https://www.nkust.edu.tw/p/a.php".to_string()
            ]
        );
    }
}
