//! Data models shared by the drivers and the JSON writer.
//!
//! - [`Record`]: one extracted item, the unit written to the output file
//! - [`ListingPage`]: a fetched listing document, alive only while paginating
//! - [`Sno`]: an activity-event identifier scraped from the activity index
//! - [`RecordCollector`] / [`Harvest`]: the per-run accumulation of records and
//!   per-item failures

use crate::error::ScrapeError;
use crate::sanitize::sanitize;
use serde::Serialize;
use std::fmt;
use tracing::{error, warn};

/// A single extracted item.
///
/// `date` is `Some("")` for news-style pages that carry no date span and
/// `None` for content types that never have one (activity, about); the latter
/// omit the key entirely in the JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub content: String,
}

impl Record {
    /// The same record with character references stripped from every text field.
    pub fn sanitized(self) -> Self {
        Self {
            title: sanitize(&self.title),
            url: self.url,
            date: self.date.as_deref().map(sanitize),
            content: sanitize(&self.content),
        }
    }
}

/// A fetched listing page paired with its 1-based index.
#[derive(Debug)]
pub struct ListingPage {
    pub index: u32,
    pub url: String,
    pub html: String,
}

/// Opaque activity-event identifier taken from `...Event?Sno=<id>` links.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sno(pub String);

impl fmt::Display for Sno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What to do when a single item cannot be fetched or parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Propagate the first item error; the run produces no output.
    #[default]
    Abort,
    /// Record the failure and carry on with the next item.
    KeepGoing,
}

/// An item skipped under [`FailurePolicy::KeepGoing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub url: String,
    pub error: String,
}

/// Everything one driver invocation produced.
#[derive(Debug, Default)]
pub struct Harvest {
    pub records: Vec<Record>,
    pub failures: Vec<ItemFailure>,
}

/// Ordered accumulator owned by a single driver run.
#[derive(Debug)]
pub struct RecordCollector {
    policy: FailurePolicy,
    harvest: Harvest,
}

impl RecordCollector {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            harvest: Harvest::default(),
        }
    }

    /// Take the outcome for one item.
    ///
    /// Successful records are sanitized and appended in arrival order.
    /// Errors propagate unless the policy is `KeepGoing`; cancellation always
    /// propagates.
    pub fn absorb(&mut self, url: &str, outcome: Result<Record, ScrapeError>) -> Result<(), ScrapeError> {
        match outcome {
            Ok(record) => {
                self.harvest.records.push(record.sanitized());
                Ok(())
            }
            Err(ScrapeError::Cancelled) => Err(ScrapeError::Cancelled),
            Err(e) if self.policy == FailurePolicy::Abort => {
                error!(%url, error = %e, "Item failed; aborting run");
                Err(e)
            }
            Err(e) => {
                warn!(%url, error = %e, "Item failed; recorded and continuing");
                self.harvest.failures.push(ItemFailure {
                    url: url.to_string(),
                    error: e.to_string(),
                });
                Ok(())
            }
        }
    }

    pub fn finish(self) -> Harvest {
        self.harvest
    }
}
