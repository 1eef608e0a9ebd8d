// src/checker/mod.rs
// =============================================================================
// This module contains all URL availability checking logic.
//
// Submodules:
// - attempt: per-attempt failure taxonomy, retry decision table, backoff
// - http: the UrlChecker (single-URL retry loop + concurrent batches)
// - metrics: concurrency-safe counters shared across in-flight checks
// - result: the per-URL CheckResult model
//
// This file (mod.rs) is the module root - it ties everything together and
// exports the public API that other parts of our application can use.
// =============================================================================

mod attempt;
mod http;
mod metrics;
mod result;

// Re-export public items from submodules
// This lets users write `checker::UrlChecker` instead of
// `checker::http::UrlChecker`
pub use http::{CheckerConfig, UrlChecker};
pub use metrics::MetricsSnapshot;
pub use result::CheckResult;
