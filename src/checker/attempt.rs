// src/checker/attempt.rs
// =============================================================================
// This module classifies the outcome of a single HTTP attempt and decides
// whether it may be retried.
//
// Key functionality:
// - AttemptError: one variant per failure class (timeout, redirect
//   exhaustion, TLS, network, other)
// - A retry decision table kept separate from any I/O so the eligibility
//   rules are testable in isolation
// - Exponential backoff delay computation with a floor and a ceiling
//
// Retry eligibility rules:
// - Timeout / Network / Other: transient, retried up to max_retries
// - TooManyRedirects: a structural property of the URL, never retried
// - Tls: certificate problems do not fix themselves, never retried
// =============================================================================

use std::time::Duration;

// Classified failure of one HTTP attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// No response within the per-attempt deadline
    Timeout,
    /// Redirect chain exceeded the configured cap
    TooManyRedirects(String),
    /// TLS certificate or handshake failure
    Tls(String),
    /// Connection-level failure (DNS, refused, reset)
    Network(String),
    /// Anything we could not classify
    Other(String),
}

impl AttemptError {
    /// Maps a reqwest error onto our failure taxonomy.
    ///
    /// reqwest does not expose a dedicated TLS error predicate, so like most
    /// checkers we fall back to inspecting the error chain text for
    /// certificate/handshake wording. Order matters: redirect and timeout
    /// errors have precise predicates and are tested first.
    pub fn classify(err: &reqwest::Error) -> Self {
        let detail = error_detail(err);
        let lowered = detail.to_lowercase();

        if err.is_redirect() {
            AttemptError::TooManyRedirects(detail)
        } else if err.is_timeout() {
            AttemptError::Timeout
        } else if lowered.contains("certificate")
            || lowered.contains("ssl")
            || lowered.contains("handshake")
        {
            AttemptError::Tls(detail)
        } else if err.is_connect() || err.is_request() {
            AttemptError::Network(detail)
        } else {
            AttemptError::Other(detail)
        }
    }

    /// The retry decision table: true for transient classes only.
    pub fn is_retryable(&self) -> bool {
        match self {
            AttemptError::Timeout | AttemptError::Network(_) | AttemptError::Other(_) => true,
            AttemptError::TooManyRedirects(_) | AttemptError::Tls(_) => false,
        }
    }

    /// The error string recorded on the terminal CheckResult.
    pub fn terminal_message(&self) -> String {
        match self {
            AttemptError::Timeout => "Timeout".to_string(),
            AttemptError::TooManyRedirects(detail) => format!("Too many redirects: {}", detail),
            AttemptError::Tls(detail) => format!("SSL error: {}", detail),
            AttemptError::Network(detail) => format!("Network error: {}", detail),
            AttemptError::Other(detail) => detail.clone(),
        }
    }
}

// Flattens an error and its source chain into one string.
//
// reqwest's Display output is often just "error sending request"; the useful
// part (connection refused, certificate expired, ...) lives in the sources.
fn error_detail(err: &reqwest::Error) -> String {
    let mut detail = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    detail
}

/// Computes the backoff delay inserted before retrying `attempt` (1-based,
/// the attempt that just failed).
///
/// Exponential shape: multiplier * 2^(attempt-1), then pulled into the
/// [min, max] window. The floor is applied last so a misconfigured
/// min > max cannot panic; the floor simply wins.
pub fn backoff_delay(multiplier: f64, min: Duration, max: Duration, attempt: u32) -> Duration {
    let exponential = multiplier * 2f64.powi(attempt.saturating_sub(1) as i32);
    let seconds = exponential.min(max.as_secs_f64()).max(min.as_secs_f64());
    Duration::from_secs_f64(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classes_are_retryable() {
        assert!(AttemptError::Timeout.is_retryable());
        assert!(AttemptError::Network("connection refused".into()).is_retryable());
        assert!(AttemptError::Other("mystery".into()).is_retryable());
    }

    #[test]
    fn test_structural_classes_are_not_retryable() {
        assert!(!AttemptError::TooManyRedirects("loop".into()).is_retryable());
        assert!(!AttemptError::Tls("certificate expired".into()).is_retryable());
    }

    #[test]
    fn test_terminal_messages() {
        assert_eq!(AttemptError::Timeout.terminal_message(), "Timeout");
        assert_eq!(
            AttemptError::Network("dns error".into()).terminal_message(),
            "Network error: dns error"
        );
        assert_eq!(
            AttemptError::Tls("bad cert".into()).terminal_message(),
            "SSL error: bad cert"
        );
        assert_eq!(
            AttemptError::TooManyRedirects("10 hops".into()).terminal_message(),
            "Too many redirects: 10 hops"
        );
        assert_eq!(
            AttemptError::Other("boom".into()).terminal_message(),
            "boom"
        );
    }

    #[test]
    fn test_backoff_respects_floor_and_ceiling() {
        let min = Duration::from_secs(4);
        let max = Duration::from_secs(10);

        // 1 * 2^0 = 1s, pulled up to the 4s floor
        assert_eq!(backoff_delay(1.0, min, max, 1), Duration::from_secs(4));
        // 1 * 2^2 = 4s, exactly the floor
        assert_eq!(backoff_delay(1.0, min, max, 3), Duration::from_secs(4));
        // 1 * 2^3 = 8s, inside the window
        assert_eq!(backoff_delay(1.0, min, max, 4), Duration::from_secs(8));
        // 1 * 2^4 = 16s, capped at the 10s ceiling
        assert_eq!(backoff_delay(1.0, min, max, 5), Duration::from_secs(10));
    }

    #[test]
    fn test_backoff_multiplier_scales_delay() {
        let min = Duration::ZERO;
        let max = Duration::from_secs(60);

        assert_eq!(backoff_delay(0.5, min, max, 1), Duration::from_secs_f64(0.5));
        assert_eq!(backoff_delay(2.0, min, max, 3), Duration::from_secs(8));
    }

    #[test]
    fn test_backoff_floor_wins_over_inverted_window() {
        let delay = backoff_delay(
            1.0,
            Duration::from_secs(10),
            Duration::from_secs(4),
            1,
        );
        assert_eq!(delay, Duration::from_secs(10));
    }
}
