//! Content-type drivers.
//!
//! Each driver pairs a discovery strategy with an extractor:
//!
//! | Content type | Module | Discovery | Extraction |
//! |--------------|--------|-----------|------------|
//! | `hot_news`, `honors` | [`news`] | numbered listing pages | `h2.hdline` / `div.mcont` tree lookup |
//! | `activity` | [`activity`] | `Sno=` tokens on one index page | raw `<h2>` scan + `div.blog-main` |
//! | `about` | [`about`] | right-hand dropdown menu links | `ol.breadcrumb` + `div.mcont` |
//!
//! Items are fetched one at a time, in discovery order, and accumulated in a
//! [`RecordCollector`](crate::models::RecordCollector) owned by the run.

pub mod about;
pub mod activity;
pub mod news;

use crate::config::{ContentTypeConfig, Discovery};
use crate::error::ScrapeError;
use crate::fetch::FetchPage;
use crate::models::{FailurePolicy, Harvest};
use crate::paginate::PageLimit;
use tracing::{info, instrument};

/// Per-run knobs shared by all drivers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Listing pages to walk (paginated content types only).
    pub max_pages: PageLimit,
    /// Cap on processed identifiers (activity only).
    pub max_items: Option<usize>,
    pub failure_policy: FailurePolicy,
}

/// Run the driver selected by `config.discovery`.
#[instrument(level = "info", skip_all, fields(content_type = %config.content_type))]
pub async fn run<F: FetchPage>(
    fetcher: &F,
    config: &ContentTypeConfig,
    options: &RunOptions,
) -> Result<Harvest, ScrapeError> {
    let harvest = match &config.discovery {
        Discovery::Paginated => news::scrape(fetcher, config, options).await?,
        Discovery::SnoIndex { event_url } => {
            activity::scrape(fetcher, &config.base_url, event_url, options).await?
        }
        Discovery::AboutMenu {
            site_root,
            link_prefix,
            breadcrumb_prefix,
        } => {
            let menu = about::AboutMenu {
                directory_url: &config.base_url,
                site_root,
                link_prefix,
                breadcrumb_prefix,
            };
            about::scrape(fetcher, &menu, options).await?
        }
    };
    info!(
        records = harvest.records.len(),
        failures = harvest.failures.len(),
        "Driver finished"
    );
    Ok(harvest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContentType, SiteConfig};
    use crate::fetch::testing::FakeSite;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_about_config_dispatches_to_menu_driver() {
        let config = SiteConfig::default().content_type(ContentType::About);
        let site = FakeSite::new()
            .page(
                &config.base_url,
                r#"<ul class="dropmenu-right"><li><a href="/p/412-1000-1.php">校史</a></li></ul>"#,
            )
            .page(
                "https://www.nkust.edu.tw/p/412-1000-1.php",
                "<ol class=\"breadcrumb\"><li>首頁</li><li>關於我們</li><li>校史</li></ol><div class=\"mcont\">沿革</div>",
            );

        let harvest = run(&site, &config, &RunOptions::default()).await.unwrap();

        assert_eq!(harvest.records.len(), 1);
        assert_eq!(harvest.records[0].title, "校史");
        assert_eq!(harvest.records[0].date, None);
    }

    #[tokio::test]
    async fn test_activity_config_dispatches_to_sno_driver() {
        let config = SiteConfig::default().content_type(ContentType::Activity);
        let site = FakeSite::new()
            .page(&config.base_url, r#"<a href="/Activity/Home/Event?Sno=S1">講座</a>"#)
            .page(
                "https://ws1.nkust.edu.tw/Activity/Home/Event?Sno=S1",
                "<h2>講座</h2><div class=\"blog-main\">內容</div>",
            );

        let harvest = run(&site, &config, &RunOptions::default()).await.unwrap();

        assert_eq!(harvest.records.len(), 1);
        assert_eq!(harvest.records[0].url, "https://ws1.nkust.edu.tw/Activity/Home/Event?Sno=S1");
        assert_eq!(site.requests()[0], config.base_url);
    }

    #[tokio::test]
    async fn test_paginated_config_dispatches_to_listing_driver() {
        let config = SiteConfig::default().content_type(ContentType::HotNews);
        let site = FakeSite::new().page(&config.page_url(1), "<html><body>no cards</body></html>");
        let options = RunOptions {
            max_pages: PageLimit::Pages(1),
            ..RunOptions::default()
        };

        let harvest = run(&site, &config, &options).await.unwrap();

        assert!(harvest.records.is_empty());
        assert_eq!(site.requests(), vec![config.page_url(1)]);
    }
}
