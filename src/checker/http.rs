// src/checker/http.rs
// =============================================================================
// This module checks if URLs are alive by making HTTP requests.
//
// Key functionality:
// - One GET per attempt with redirect following, TLS verification, and a
//   per-attempt timeout
// - A bounded retry loop with exponential backoff for transient failures
// - Terminal classification for structural failures (redirect loops, TLS)
// - Concurrent batch checking that preserves input order in the output
// - Shared metrics and URL dedup across all in-flight checks
//
// The checker never surfaces a network failure as an error to its caller:
// every failure mode becomes a terminal CheckResult. The only Err that can
// escape check_url is the precondition class (a syntactically invalid URL),
// and safe_check_url absorbs even that for batch contexts.
// =============================================================================

use anyhow::{Context, Result};
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{redirect, Client, Response};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, warn};
use url::Url;

use super::attempt::{backoff_delay, AttemptError};
use super::metrics::{Metrics, MetricsSnapshot};
use super::result::CheckResult;

// Configuration for a checker instance
//
// Defaults mirror a patient interactive checker: 5s per attempt, 3 attempts,
// a 4-10s backoff window, and a browser-like User-Agent so bot-hostile sites
// answer like they would for a real visitor.
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Deadline for a single attempt (redirect chain included)
    pub timeout: Duration,
    /// Attempts per URL, first attempt included
    pub max_retries: u32,
    /// Backoff multiplier applied to 2^(attempt-1)
    pub retry_multiplier: f64,
    /// Backoff floor
    pub retry_min_delay: Duration,
    /// Backoff ceiling
    pub retry_max_delay: Duration,
    /// Redirects followed before an attempt fails as TooManyRedirects
    pub max_redirects: usize,
    /// Request headers sent with every attempt
    pub headers: HashMap<String, String>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        let mut headers = HashMap::new();
        headers.insert(
            "User-Agent".to_string(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
        );
        CheckerConfig {
            timeout: Duration::from_secs(5),
            max_retries: 3,
            retry_multiplier: 1.0,
            retry_min_delay: Duration::from_secs(4),
            retry_max_delay: Duration::from_secs(10),
            max_redirects: 20,
            headers,
        }
    }
}

// Checks URL availability with retries, shared metrics, and cancellation
//
// One instance owns one reqwest::Client (and with it one connection pool),
// one metrics accumulator, and one URL dedup set. All three live and die
// with the instance: dropping the checker drains the pool, so acquisition
// and release bracket the instance's scope on every exit path.
pub struct UrlChecker {
    client: Client,
    config: CheckerConfig,
    metrics: Metrics,
    cancelled: AtomicBool,
}

impl UrlChecker {
    /// Builds the shared HTTP client up front; fails only on unusable
    /// configuration (e.g. a header name that is not valid HTTP).
    pub fn new(config: CheckerConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::try_from(name.as_str())
                .with_context(|| format!("invalid header name: {}", name))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("invalid header value for {}", name))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(redirect::Policy::limited(config.max_redirects))
            .default_headers(headers)
            .build()
            .context("failed to create HTTP client")?;

        Ok(UrlChecker {
            client,
            config,
            metrics: Metrics::new(),
            cancelled: AtomicBool::new(false),
        })
    }

    /// Returns a detached copy of the metrics, safe to read mid-batch.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Requests cooperative termination: in-flight checks finish on their
    /// own, no new URL starts, and no further retry attempt is issued.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Checks one URL, retrying transient failures up to max_retries.
    ///
    /// Every network outcome is folded into the returned CheckResult. The
    /// Err arm carries only precondition violations (the URL does not parse),
    /// which batch callers absorb via safe_check_url.
    pub async fn check_url(&self, url: &str) -> Result<CheckResult> {
        Url::parse(url).with_context(|| format!("invalid URL: {}", url))?;

        self.metrics.record_url(url);
        let start = Instant::now();

        for attempt in 1..=self.config.max_retries {
            // Cancellation is honored between attempts only; the first
            // attempt of a started URL always runs.
            if attempt > 1 && self.is_cancelled() {
                self.metrics.record_failure();
                return Ok(CheckResult::failure(
                    url,
                    "Cancelled",
                    start.elapsed(),
                    attempt - 1,
                ));
            }

            self.metrics.record_attempt();
            let retry_count = attempt - 1;

            let err = match self.client.get(url).send().await {
                Ok(response) => {
                    self.metrics.record_success();
                    return Ok(self.response_result(url, response, start.elapsed(), retry_count));
                }
                Err(err) => err,
            };

            let outcome = AttemptError::classify(&err);

            // Structural failures end the loop at whatever attempt they
            // first occur; the decision table owns the eligibility rule.
            if !outcome.is_retryable() {
                match &outcome {
                    AttemptError::Tls(_) => {
                        error!(url, error = %err, "TLS error");
                        self.metrics.record_ssl_error();
                    }
                    _ => {
                        warn!(url, "too many redirects");
                        self.metrics.record_failure();
                    }
                }
                return Ok(CheckResult::failure(
                    url,
                    outcome.terminal_message(),
                    start.elapsed(),
                    retry_count,
                ));
            }

            if attempt == self.config.max_retries {
                match &outcome {
                    AttemptError::Timeout => {
                        warn!(url, "timeout on final attempt");
                        self.metrics.record_timeout_error();
                    }
                    AttemptError::Network(_) => {
                        error!(url, error = %err, "network error on final attempt");
                        self.metrics.record_network_error();
                    }
                    _ => {
                        error!(url, error = %err, "unexpected error on final attempt");
                        self.metrics.record_other_error();
                    }
                }
                self.metrics.record_failure();
                return Ok(CheckResult::failure(
                    url,
                    outcome.terminal_message(),
                    start.elapsed(),
                    self.config.max_retries,
                ));
            }

            let delay = backoff_delay(
                self.config.retry_multiplier,
                self.config.retry_min_delay,
                self.config.retry_max_delay,
                attempt,
            );
            info!(
                url,
                attempt = attempt + 1,
                max_retries = self.config.max_retries,
                delay_ms = delay.as_millis() as u64,
                "retrying after transient failure"
            );
            tokio::time::sleep(delay).await;
        }

        // Unreachable while max_retries >= 1; kept so a zero-attempt
        // configuration still yields a well-formed result.
        self.metrics.record_failure();
        Ok(CheckResult::failure(
            url,
            "Unknown error",
            start.elapsed(),
            self.config.max_retries,
        ))
    }

    /// The batch safety net: converts any error escaping check_url into a
    /// terminal CheckResult so one bad URL can never abort a batch.
    pub async fn safe_check_url(&self, url: &str) -> CheckResult {
        let start = Instant::now();
        match self.check_url(url).await {
            Ok(result) => result,
            Err(err) => {
                self.metrics.record_failure();
                CheckResult::failure(
                    url,
                    err.to_string(),
                    start.elapsed(),
                    self.config.max_retries,
                )
            }
        }
    }

    /// Checks all URLs concurrently with no concurrency ceiling.
    ///
    /// The output always has the same length and order as the input, even
    /// when individual URLs fail or hang up to their timeout.
    pub async fn check_urls(&self, urls: &[String]) -> Vec<CheckResult> {
        self.run_batch(urls, 0, None).await
    }

    /// Like check_urls, but at most `limit` URLs are in flight at once
    /// (0 = unbounded). Completion order may differ; output order does not.
    pub async fn check_urls_bounded(&self, urls: &[String], limit: usize) -> Vec<CheckResult> {
        self.run_batch(urls, limit, None).await
    }

    /// Bounded batch that additionally clones each result into `progress`
    /// as it completes (in completion order). The channel is notify-only;
    /// a dropped receiver does not disturb the batch.
    pub async fn check_urls_with_progress(
        &self,
        urls: &[String],
        limit: usize,
        progress: UnboundedSender<CheckResult>,
    ) -> Vec<CheckResult> {
        self.run_batch(urls, limit, Some(progress)).await
    }

    async fn run_batch(
        &self,
        urls: &[String],
        limit: usize,
        progress: Option<UnboundedSender<CheckResult>>,
    ) -> Vec<CheckResult> {
        let tasks = urls.iter().map(|url| {
            let progress = progress.clone();
            async move {
                // Once cancellation is observed, not-yet-started URLs still
                // get their result slot, just without any network attempt.
                let result = if self.is_cancelled() {
                    CheckResult::failure(url, "Cancelled", Duration::ZERO, 0)
                } else {
                    self.safe_check_url(url).await
                };
                if let Some(tx) = &progress {
                    let _ = tx.send(result.clone());
                }
                result
            }
        });

        if limit == 0 {
            join_all(tasks).await
        } else {
            stream::iter(tasks).buffered(limit).collect().await
        }
    }

    // Builds the result for an obtained response, whatever its status code.
    fn response_result(
        &self,
        url: &str,
        response: Response,
        elapsed: Duration,
        retry_count: u32,
    ) -> CheckResult {
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).to_string(),
                )
            })
            .collect();
        let content_type = headers.get("content-type").cloned();

        CheckResult {
            url: url.to_string(),
            status,
            is_available: (200..400).contains(&status),
            final_url: Some(final_url),
            error: None,
            headers: Some(headers),
            content_type,
            response_time: elapsed.as_secs_f64(),
            retry_count,
        }
    }
}
