//! # NKUST Scraper
//!
//! Scrapes the public pages of the National Kaohsiung University of Science
//! and Technology website and saves them as timestamped JSON files.
//!
//! ## Content types
//!
//! - `hot-news`: the hot news (焦點新聞) listing
//! - `honors`: the honor roll (榮譽榜) listing
//! - `activity`: events on the activity site, found by their `Sno` identifiers
//! - `about`: pages linked from the "about us" menu
//!
//! ## Usage
//!
//! ```sh
//! nkust_scraper -o ./data hot-news --max-pages 1
//! ```
//!
//! ## Architecture
//!
//! 1. **Discovery**: walk listing pages, scrape identifiers, or read a menu
//! 2. **Fetching**: download each item page, one at a time
//! 3. **Extraction**: pull title, date and body text out of the markup
//! 4. **Output**: write the records as `<content_type>_<YYYYMMDD-HHMMSS>.json`

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod drivers;
mod error;
mod extract;
mod fetch;
mod models;
mod outputs;
mod paginate;
mod sanitize;
mod utils;

use cli::Cli;
use config::AppConfig;
use fetch::build_fetcher;
use outputs::json;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let started = Local::now();
    info!("nkust_scraper starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = AppConfig::load(args.config.as_deref()).await?;
    args.apply_overrides(&mut config.fetch);
    let content_type = args.content_type();
    let target = config.site.content_type(content_type);
    let options = args.run_options();
    info!(%content_type, base_url = %target.base_url, ?options, "Resolved run configuration");

    // Fail before any fetch if the output cannot be written
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Cancellation: ctrl-c and optional run deadline ----
    let token = CancellationToken::new();
    {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received; cancelling run");
                token.cancel();
            }
        });
    }
    if let Some(secs) = args.run_timeout_secs {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            warn!(secs, "Run deadline reached; cancelling run");
            token.cancel();
        });
    }

    let fetcher = build_fetcher(&config.fetch, token)?;
    debug!(?config.fetch, "Fetcher ready");

    // ---- Scrape ----
    let harvest = match drivers::run(&fetcher, &target, &options).await {
        Ok(harvest) => harvest,
        Err(e) => {
            error!(%content_type, error = %e, "Run aborted; no output written");
            return Err(e.into());
        }
    };

    // ---- Output ----
    json::write_records(&harvest.records, &args.output_dir, content_type, &started).await?;
    if !harvest.failures.is_empty() {
        warn!(count = harvest.failures.len(), "Some items failed and were skipped");
        json::write_failures(&harvest.failures, &args.output_dir, content_type, &started).await?;
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        records = harvest.records.len(),
        failures = harvest.failures.len(),
        "Execution complete"
    );
    Ok(())
}
