//! Typed errors for the scraping pipeline.
//!
//! Every failure the drivers can hit while talking to the site or reading its
//! markup is one of the [`ScrapeError`] variants. The binary's outer layer
//! (config loading, output writing) stays on `Box<dyn Error>`.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while discovering, fetching or parsing pages.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A required element is missing from the page.
    #[error("missing required element `{selector}` in {url}")]
    Parse { url: String, selector: String },

    /// The request never produced a response (timeout, DNS, connection reset, ...).
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    /// A discovered link could not be turned into an absolute URL.
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The run was cancelled (ctrl-c or run deadline).
    #[error("run cancelled")]
    Cancelled,
}

impl ScrapeError {
    pub fn parse(url: impl Into<String>, selector: impl Into<String>) -> Self {
        Self::Parse {
            url: url.into(),
            selector: selector.into(),
        }
    }

    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_request()
            }
            Self::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::Parse { .. } | Self::InvalidUrl { .. } | Self::Cancelled => false,
        }
    }
}
