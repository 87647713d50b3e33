//! Page fetching with retry, pacing and cancellation.
//!
//! Fetching sits behind the [`FetchPage`] trait so that behaviour can be
//! layered with decorators:
//! - [`HttpFetcher`]: a `reqwest` client with a per-request timeout
//! - [`RetryFetch`]: exponential backoff with jitter for transient failures
//! - [`PacedFetch`]: a minimum gap between consecutive requests
//! - [`CancellableFetch`]: races every fetch against a cancellation token
//!
//! # Retry Strategy
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), 30s) + random_jitter(0..250ms)
//! ```
//!
//! Only errors for which [`ScrapeError::is_transient`] holds are retried.

use crate::config::FetchConfig;
use crate::error::ScrapeError;
use rand::{Rng, rng};
use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

/// Something that can turn a URL into a response body.
pub trait FetchPage {
    /// GET `url` and return the body as text.
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError>;
}

/// Plain HTTP GET over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout());
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl FetchPage for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let t0 = Instant::now();
        let network = |source| ScrapeError::Network {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status,
            });
        }
        let body = response.text().await.map_err(network)?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}

/// Decorator that retries transient failures with exponential backoff.
pub struct RetryFetch<T> {
    inner: T,
    /// Retries after the first attempt.
    max_retries: usize,
    /// Delay before the first retry; doubles each attempt.
    base_delay: Duration,
    max_delay: Duration,
    max_jitter: Duration,
}

impl<T> RetryFetch<T>
where
    T: FetchPage,
{
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
            max_jitter: Duration::from_millis(250),
        }
    }

    pub fn with_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    fn backoff(&self, attempt: usize) -> Duration {
        let shift = (attempt.saturating_sub(1)).min(16) as u32;
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=self.max_jitter.as_millis() as u64);
        delay + Duration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> FetchPage for RetryFetch<T>
where
    T: FetchPage,
{
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let mut attempt = 0usize;
        loop {
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        error!(%url, attempt, max = self.max_retries, error = %e, "fetch exhausted retries");
                        return Err(e);
                    }
                    let delay = self.backoff(attempt);
                    warn!(%url, attempt, max = self.max_retries, ?delay, error = %e, "fetch failed; backing off");
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Decorator that keeps at least `delay` between the starts of consecutive requests.
#[derive(Debug)]
pub struct PacedFetch<T> {
    inner: T,
    delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl<T> PacedFetch<T> {
    pub fn new(inner: T, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            last_request: Mutex::new(None),
        }
    }

    fn wait_time(&self) -> Duration {
        let mut last = self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = Instant::now();
        let wait = match *last {
            Some(prev) => self.delay.saturating_sub(now.duration_since(prev)),
            None => Duration::ZERO,
        };
        *last = Some(now + wait);
        wait
    }
}

impl<T> FetchPage for PacedFetch<T>
where
    T: FetchPage,
{
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        if !self.delay.is_zero() {
            let wait = self.wait_time();
            if !wait.is_zero() {
                debug!(%url, ?wait, "Pacing request");
                sleep(wait).await;
            }
        }
        self.inner.fetch(url).await
    }
}

/// Decorator that aborts in-flight fetches once the token is cancelled.
#[derive(Debug)]
pub struct CancellableFetch<T> {
    inner: T,
    token: CancellationToken,
}

impl<T> CancellableFetch<T> {
    pub fn new(inner: T, token: CancellationToken) -> Self {
        Self { inner, token }
    }
}

impl<T> FetchPage for CancellableFetch<T>
where
    T: FetchPage,
{
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        if self.token.is_cancelled() {
            return Err(ScrapeError::Cancelled);
        }
        tokio::select! {
            _ = self.token.cancelled() => Err(ScrapeError::Cancelled),
            result = self.inner.fetch(url) => result,
        }
    }
}

/// Build the full decorator stack described by `config`.
pub fn build_fetcher(
    config: &FetchConfig,
    token: CancellationToken,
) -> Result<CancellableFetch<RetryFetch<PacedFetch<HttpFetcher>>>, reqwest::Error> {
    let http = HttpFetcher::new(config)?;
    let paced = PacedFetch::new(http, config.request_delay());
    let retrying = RetryFetch::new(paced, config.max_retries, config.backoff_base());
    Ok(CancellableFetch::new(retrying, token))
}
