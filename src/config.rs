// src/config.rs
// =============================================================================
// This module handles the application's on-disk configuration.
//
// Key functionality:
// - A JSON config file with the same knobs as the checker plus the
//   worker-pool width and a default input file
// - A missing file silently falls back to defaults
// - CLI flags override whatever the file said
// =============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::checker::CheckerConfig;
use crate::cli::Cli;

// Application configuration, loadable from a JSON file
//
// #[serde(default)] lets a config file specify only the fields it wants
// to change; everything else keeps its default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Per-attempt timeout in seconds
    pub timeout: u64,
    /// Attempts per URL, first attempt included
    pub retries: u32,
    /// URLs checked in parallel; 0 = no ceiling
    pub threads: usize,
    /// Redirects followed before a URL fails as a redirect loop
    pub max_redirects: usize,
    /// Backoff multiplier applied to 2^(attempt-1)
    pub retry_multiplier: f64,
    /// Backoff floor in seconds
    pub retry_min_delay: f64,
    /// Backoff ceiling in seconds
    pub retry_max_delay: f64,
    /// Default input file with one URL per line
    pub input_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            timeout: 5,
            retries: 3,
            threads: 4,
            max_redirects: 20,
            retry_multiplier: 1.0,
            retry_min_delay: 4.0,
            retry_max_delay: 10.0,
            input_file: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a JSON file; a missing file yields defaults,
    /// an unreadable or malformed file is a hard error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Applies CLI overrides on top of file/default values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(timeout) = cli.timeout {
            self.timeout = timeout;
        }
        if let Some(retries) = cli.max_retries {
            self.retries = retries;
        }
        if let Some(max_redirects) = cli.max_redirects {
            self.max_redirects = max_redirects;
        }
        if let Some(concurrency) = cli.concurrency {
            self.threads = concurrency;
        }
        if let Some(input) = &cli.input {
            self.input_file = Some(input.display().to_string());
        }
    }

    /// Translates the application config into the checker's own config.
    ///
    /// The backoff knobs come straight from a user-editable file, so they
    /// are validated here; Duration::from_secs_f64 would panic on a
    /// negative or non-finite value.
    pub fn checker_config(&self) -> Result<CheckerConfig> {
        ensure_seconds("retry_min_delay", self.retry_min_delay)?;
        ensure_seconds("retry_max_delay", self.retry_max_delay)?;
        ensure_seconds("retry_multiplier", self.retry_multiplier)?;

        Ok(CheckerConfig {
            timeout: Duration::from_secs(self.timeout),
            max_retries: self.retries,
            retry_multiplier: self.retry_multiplier,
            retry_min_delay: Duration::from_secs_f64(self.retry_min_delay),
            retry_max_delay: Duration::from_secs_f64(self.retry_max_delay),
            max_redirects: self.max_redirects,
            ..CheckerConfig::default()
        })
    }
}

fn ensure_seconds(field: &str, value: f64) -> Result<()> {
    anyhow::ensure!(
        value.is_finite() && value >= 0.0,
        "{} must be a non-negative number, got {}",
        field,
        value
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.timeout, 5);
        assert_eq!(config.retries, 3);
        assert_eq!(config.threads, 4);
        assert_eq!(config.max_redirects, 20);
        assert!(config.input_file.is_none());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/url-sentinel.json")).unwrap();
        assert_eq!(config.timeout, AppConfig::default().timeout);
    }

    #[test]
    fn test_partial_file_overrides_only_named_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"timeout": 30, "threads": 16}}"#).unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.timeout, 30);
        assert_eq!(config.threads, 16);
        // Untouched fields keep defaults
        assert_eq!(config.retries, 3);
        assert_eq!(config.max_redirects, 20);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json at all").unwrap();

        assert!(AppConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_cli_overrides_file_values() {
        use clap::Parser;

        let cli = crate::cli::Cli::parse_from([
            "url-sentinel",
            "--timeout",
            "9",
            "--concurrency",
            "2",
            "--max-retries",
            "1",
            "http://example.com",
        ]);

        let mut config = AppConfig::default();
        config.apply_cli(&cli);

        assert_eq!(config.timeout, 9);
        assert_eq!(config.threads, 2);
        assert_eq!(config.retries, 1);
        // Flags not given keep the file/default value
        assert_eq!(config.max_redirects, 20);
    }

    #[test]
    fn test_checker_config_translation() {
        let config = AppConfig {
            timeout: 2,
            retries: 5,
            retry_min_delay: 0.5,
            retry_max_delay: 8.0,
            max_redirects: 7,
            ..AppConfig::default()
        };

        let checker = config.checker_config().unwrap();
        assert_eq!(checker.timeout, Duration::from_secs(2));
        assert_eq!(checker.max_retries, 5);
        assert_eq!(checker.retry_min_delay, Duration::from_secs_f64(0.5));
        assert_eq!(checker.retry_max_delay, Duration::from_secs(8));
        assert_eq!(checker.max_redirects, 7);
        // Headers come from the checker defaults (browser-like User-Agent)
        assert!(checker.headers.contains_key("User-Agent"));
    }

    #[test]
    fn test_negative_backoff_delay_is_rejected() {
        let config = AppConfig {
            retry_min_delay: -1.0,
            ..AppConfig::default()
        };

        let err = config.checker_config().unwrap_err();
        assert!(err.to_string().contains("retry_min_delay"));
    }

    #[test]
    fn test_negative_multiplier_is_rejected() {
        let config = AppConfig {
            retry_multiplier: -0.5,
            ..AppConfig::default()
        };

        assert!(config.checker_config().is_err());
    }
}
