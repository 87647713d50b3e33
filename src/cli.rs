//! Command-line interface definitions.
//!
//! One subcommand per content type; fetch behaviour flags are global and
//! override values from the optional YAML config file.

use crate::config::{ContentType, FetchConfig};
use crate::drivers::RunOptions;
use crate::models::FailurePolicy;
use crate::paginate::PageLimit;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the NKUST scraper.
///
/// # Examples
///
/// ```sh
/// # Every page of the hot news listing
/// nkust_scraper hot-news
///
/// # First two honor-roll pages, into ./data
/// nkust_scraper -o ./data honors --max-pages 2
///
/// # Ten activities, one request per second, skip broken pages
/// nkust_scraper --request-delay-ms 1000 --keep-going activity --max-items 10
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory the JSON output is written to
    #[arg(short, long, global = true, default_value = ".")]
    pub output_dir: PathBuf,

    /// Optional path to a YAML config file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Retries for transient network failures
    #[arg(long, global = true)]
    pub max_retries: Option<usize>,

    /// Minimum delay between consecutive requests, in milliseconds
    #[arg(long, global = true)]
    pub request_delay_ms: Option<u64>,

    /// Cancel the whole run after this many seconds
    #[arg(long, global = true)]
    pub run_timeout_secs: Option<u64>,

    /// Record failing items and continue instead of aborting the run
    #[arg(long, global = true)]
    pub keep_going: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Scrape the hot news (焦點新聞) listing
    HotNews {
        /// Listing pages to walk; omit to detect the page count
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_pages: Option<u32>,
    },
    /// Scrape the honor roll (榮譽榜) listing
    Honors {
        /// Listing pages to walk; omit to detect the page count
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_pages: Option<u32>,
    },
    /// Scrape the activity site
    Activity {
        /// Maximum number of distinct activities to fetch
        #[arg(long)]
        max_items: Option<usize>,
    },
    /// Scrape the "about us" pages
    About,
}

impl Cli {
    pub fn content_type(&self) -> ContentType {
        match self.command {
            Command::HotNews { .. } => ContentType::HotNews,
            Command::Honors { .. } => ContentType::Honors,
            Command::Activity { .. } => ContentType::Activity,
            Command::About => ContentType::About,
        }
    }

    pub fn run_options(&self) -> RunOptions {
        let (max_pages, max_items) = match self.command {
            Command::HotNews { max_pages } | Command::Honors { max_pages } => (max_pages, None),
            Command::Activity { max_items } => (None, max_items),
            Command::About => (None, None),
        };
        RunOptions {
            max_pages: PageLimit::from(max_pages),
            max_items,
            failure_policy: if self.keep_going {
                FailurePolicy::KeepGoing
            } else {
                FailurePolicy::Abort
            },
        }
    }

    /// Apply fetch overrides given on the command line.
    pub fn apply_overrides(&self, fetch: &mut FetchConfig) {
        if let Some(secs) = self.timeout_secs {
            fetch.timeout_secs = secs;
        }
        if let Some(retries) = self.max_retries {
            fetch.max_retries = retries;
        }
        if let Some(delay) = self.request_delay_ms {
            fetch.request_delay_ms = delay;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hot_news_defaults_to_auto_detect() {
        let cli = Cli::parse_from(["nkust_scraper", "hot-news"]);
        assert_eq!(cli.content_type(), ContentType::HotNews);
        assert_eq!(cli.run_options().max_pages, PageLimit::Auto);
        assert_eq!(cli.run_options().failure_policy, FailurePolicy::Abort);
        assert_eq!(cli.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_honors_with_page_limit_and_globals() {
        let cli = Cli::parse_from([
            "nkust_scraper",
            "honors",
            "--max-pages",
            "2",
            "-o",
            "/tmp/out",
            "--keep-going",
        ]);
        assert_eq!(cli.content_type(), ContentType::Honors);
        let options = cli.run_options();
        assert_eq!(options.max_pages, PageLimit::Pages(2));
        assert_eq!(options.failure_policy, FailurePolicy::KeepGoing);
        assert_eq!(cli.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_zero_pages_rejected() {
        assert!(Cli::try_parse_from(["nkust_scraper", "hot-news", "--max-pages", "0"]).is_err());
    }

    #[test]
    fn test_activity_and_overrides() {
        let cli = Cli::parse_from([
            "nkust_scraper",
            "--timeout-secs",
            "5",
            "--request-delay-ms",
            "250",
            "activity",
            "--max-items",
            "10",
        ]);
        assert_eq!(cli.run_options().max_items, Some(10));
        let mut fetch = FetchConfig::default();
        cli.apply_overrides(&mut fetch);
        assert_eq!(fetch.timeout_secs, 5);
        assert_eq!(fetch.request_delay_ms, 250);
        assert_eq!(fetch.max_retries, 3);
    }

    #[test]
    fn test_about_takes_no_limits() {
        let cli = Cli::parse_from(["nkust_scraper", "about"]);
        assert_eq!(cli.content_type(), ContentType::About);
        assert_eq!(cli.run_options().max_items, None);
    }
}
