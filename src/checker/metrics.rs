// src/checker/metrics.rs
// =============================================================================
// This module tracks request metrics for a checker instance.
//
// Key functionality:
// - Eight monotone counters updated as checks progress
// - A dedup set so each distinct URL counts toward unique_requests once
// - A snapshot() that returns a plain copy, safe to read mid-batch
//
// Checks run concurrently and all share one Metrics value, so every counter
// is atomic and the dedup set sits behind a mutex. Counters reset only by
// creating a new checker instance.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

// Live counters owned by a UrlChecker and shared by its in-flight checks
#[derive(Debug, Default)]
pub struct Metrics {
    total_requests: AtomicU64,
    unique_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    timeout_errors: AtomicU64,
    network_errors: AtomicU64,
    ssl_errors: AtomicU64,
    other_errors: AtomicU64,
    seen_urls: Mutex<HashSet<String>>,
}

// A point-in-time copy of the counters, detached from the live instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Every HTTP attempt issued, retries included
    pub total_requests: u64,
    /// Distinct URLs seen across the instance's lifetime
    pub unique_requests: u64,
    /// Attempts that yielded a response object (any status code)
    pub successful_requests: u64,
    /// URLs that ended in a terminal failure
    pub failed_requests: u64,
    pub timeout_errors: u64,
    pub network_errors: u64,
    pub ssl_errors: u64,
    pub other_errors: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a URL entered the checker; first sighting counts as unique.
    pub fn record_url(&self, url: &str) {
        let mut seen = self
            .seen_urls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if seen.insert(url.to_string()) {
            self.unique_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records one HTTP attempt being issued.
    pub fn record_attempt(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self) {
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout_error(&self) {
        self.timeout_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_network_error(&self) {
        self.network_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ssl_error(&self) {
        self.ssl_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_other_error(&self) {
        self.other_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a detached copy of the counters.
    ///
    /// Safe to call while checks are still running; the copy is not required
    /// to be a single consistent cut across all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            unique_requests: self.unique_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            timeout_errors: self.timeout_errors.load(Ordering::Relaxed),
            network_errors: self.network_errors.load(Ordering::Relaxed),
            ssl_errors: self.ssl_errors.load(Ordering::Relaxed),
            other_errors: self.other_errors.load(Ordering::Relaxed),
        }
    }
}
