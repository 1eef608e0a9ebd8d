// src/checker/result.rs
// =============================================================================
// This module defines the outcome of checking a single URL.
//
// Key functionality:
// - One immutable CheckResult per checked URL
// - Failures carry an error string; successes carry response metadata
// - Serializes to JSON for --json output
//
// A failed check has the same shape as a successful one: callers branch on
// `is_available` / `error`, never on an exception.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

// Represents the result of checking a single URL
//
// `status` is 0 when no HTTP response was obtained at all (timeout, network
// failure, SSL failure, too many redirects). `response_time` covers the whole
// attempt sequence for the URL, including retries and backoff waits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// The URL that was submitted for checking
    pub url: String,
    /// HTTP status code of the final response, or 0 if none was obtained
    pub status: u16,
    /// True iff a response was obtained and 200 <= status < 400
    pub is_available: bool,
    /// The URL after following redirects; absent when no response was obtained
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    /// Human-readable error description; present iff the check failed terminally
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Response headers (reqwest normalizes names to lowercase); absent on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    /// Value of the content-type header; absent if missing or on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Wall-clock seconds for the entire attempt sequence, retries included
    pub response_time: f64,
    /// Retry attempts consumed before the final outcome (0 = first attempt decided)
    pub retry_count: u32,
}

impl CheckResult {
    /// Builds a terminal failure result: no status, no headers, no final URL.
    pub fn failure(
        url: &str,
        error: impl Into<String>,
        elapsed: Duration,
        retry_count: u32,
    ) -> Self {
        CheckResult {
            url: url.to_string(),
            status: 0,
            is_available: false,
            final_url: None,
            error: Some(error.into()),
            headers: None,
            content_type: None,
            response_time: elapsed.as_secs_f64(),
            retry_count,
        }
    }
}
