//! Site and fetch configuration.
//!
//! The set of content types is closed, so configuration is an enum plus a
//! resolver rather than a string-keyed table. [`AppConfig`] can be loaded from
//! an optional YAML file; every field has a default that targets the live site.

use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::time::Duration;
use tracing::{info, instrument};

/// Placeholder substituted with the 1-based listing page number.
pub const PAGE_PLACEHOLDER: &str = "{page}";
/// Placeholder substituted with an activity [`Sno`](crate::models::Sno).
pub const SNO_PLACEHOLDER: &str = "{sno}";

/// The four kinds of content the scraper knows how to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    HotNews,
    Honors,
    Activity,
    About,
}

impl ContentType {
    /// Stable name used in logs and output file names.
    pub fn slug(self) -> &'static str {
        match self {
            ContentType::HotNews => "hot_news",
            ContentType::Honors => "honors",
            ContentType::Activity => "activity",
            ContentType::About => "about",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// How a content type finds the URLs of its items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    /// Walk numbered listing pages built from a `{page}` template.
    Paginated,
    /// Scrape `Sno=` identifiers from one index page and build event URLs from
    /// `event_url` (a `{sno}` template).
    SnoIndex { event_url: String },
    /// Follow the links of the right-hand dropdown menu of one directory page.
    AboutMenu {
        site_root: String,
        link_prefix: String,
        breadcrumb_prefix: String,
    },
}

/// Resolved, immutable configuration for one content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeConfig {
    pub content_type: ContentType,
    /// Listing template (with `{page}`), activity index, or about directory URL.
    pub base_url: String,
    pub discovery: Discovery,
}

impl ContentTypeConfig {
    /// Listing URL for a 1-based page number.
    pub fn page_url(&self, page: u32) -> String {
        self.base_url.replace(PAGE_PLACEHOLDER, &page.to_string())
    }
}

/// Where the site lives and how its sections are addressed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub site_root: String,
    pub lang: String,
    pub hot_news_listing: String,
    pub honors_listing: String,
    pub activity_index: String,
    pub activity_event: String,
    pub about_directory: String,
    pub about_link_prefix: String,
    pub about_breadcrumb_prefix: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_root: "https://www.nkust.edu.tw".to_string(),
            lang: "zh-tw".to_string(),
            hot_news_listing: "/p/403-1000-1363-{page}.php".to_string(),
            honors_listing: "/p/403-1000-13-{page}.php".to_string(),
            activity_index: "https://ws1.nkust.edu.tw/Activity/".to_string(),
            activity_event: "https://ws1.nkust.edu.tw/Activity/Home/Event?Sno={sno}".to_string(),
            about_directory: "/p/412-1000-617.php".to_string(),
            about_link_prefix: "/p/".to_string(),
            about_breadcrumb_prefix: "首頁關於我們".to_string(),
        }
    }
}

impl SiteConfig {
    fn on_site(&self, path: &str) -> String {
        format!("{}{}", self.site_root.trim_end_matches('/'), path)
    }

    fn listing(&self, path: &str) -> String {
        format!("{}?Lang={}", self.on_site(path), self.lang)
    }

    /// Resolve the configuration for one content type.
    pub fn content_type(&self, content_type: ContentType) -> ContentTypeConfig {
        let (base_url, discovery) = match content_type {
            ContentType::HotNews => (self.listing(&self.hot_news_listing), Discovery::Paginated),
            ContentType::Honors => (self.listing(&self.honors_listing), Discovery::Paginated),
            ContentType::Activity => (
                self.activity_index.clone(),
                Discovery::SnoIndex {
                    event_url: self.activity_event.clone(),
                },
            ),
            ContentType::About => (
                self.on_site(&self.about_directory),
                Discovery::AboutMenu {
                    site_root: self.site_root.trim_end_matches('/').to_string(),
                    link_prefix: self.about_link_prefix.clone(),
                    breadcrumb_prefix: self.about_breadcrumb_prefix.clone(),
                },
            ),
        };
        ContentTypeConfig {
            content_type,
            base_url,
            discovery,
        }
    }
}

/// HTTP behaviour: timeouts, retries and pacing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub max_retries: usize,
    pub backoff_base_ms: u64,
    pub request_delay_ms: u64,
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            backoff_base_ms: 1000,
            request_delay_ms: 0,
            user_agent: None,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// Top-level configuration file layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub fetch: FetchConfig,
}

impl AppConfig {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Load from `path`, or fall back to defaults when no path is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self, Box<dyn Error>> {
        let Some(path) = path else {
            info!("No config file given; using built-in defaults");
            return Ok(Self::default());
        };
        let text = tokio::fs::read_to_string(path).await?;
        let config = Self::from_yaml(&text)?;
        info!(path, site_root = %config.site.site_root, "Loaded configuration");
        Ok(config)
    }
}
