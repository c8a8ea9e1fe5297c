// src/config.rs
// =============================================================================
// Crawl configuration.
//
// A CrawlConfig can come from three places, in increasing priority:
// 1. Defaults (5 workers, 250ms monitor interval, 10s request timeout)
// 2. A JSON config file (--config crawl.json)
// 3. Command-line flags
//
// Example config file:
//   { "root_url": "https://example.com/", "num_workers": 8, "fail_fast": true }
// =============================================================================

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CrawlError, Result};

/// Default number of concurrent workers.
pub const DEFAULT_NUM_WORKERS: usize = 5;
/// Default pause between two termination checks, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;
/// Default per-request timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Configuration for one crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// URL to start crawling from
    #[serde(default)]
    pub root_url: String,

    /// Number of workers fetching concurrently
    #[serde(default = "default_num_workers")]
    pub num_workers: usize,

    /// How long the termination monitor sleeps between checks
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Per-request timeout for the HTTP fetcher
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Abort the whole crawl on the first failed fetch
    #[serde(default)]
    pub fail_fast: bool,
}

fn default_num_workers() -> usize {
    DEFAULT_NUM_WORKERS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

impl CrawlConfig {
    /// Create a configuration with default values
    pub fn new(root_url: &str) -> Self {
        Self {
            root_url: root_url.to_string(),
            num_workers: default_num_workers(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
            fail_fast: false,
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn with_root_url(mut self, root_url: &str) -> Self {
        self.root_url = root_url.to_string();
        self
    }

    pub fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    pub fn with_request_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.request_timeout_secs = timeout_secs;
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Reject settings the crawl cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.root_url.trim().is_empty() {
            return Err(CrawlError::Config("a root URL is required".to_string()));
        }
        if self.num_workers == 0 {
            return Err(CrawlError::Config("at least one worker is required".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(CrawlError::Config("the poll interval must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CrawlConfig::new("http://www.example.com/");
        assert_eq!(config.num_workers, 5);
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert!(!config.fail_fast);
        assert!(config.user_agent.starts_with("site-crawler/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let config = CrawlConfig::new("http://www.example.com/").with_num_workers(0);
        assert!(matches!(config.validate(), Err(CrawlError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_missing_root() {
        assert!(matches!(CrawlConfig::new("  ").validate(), Err(CrawlError::Config(_))));
    }

    #[test]
    fn test_from_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"root_url": "https://www.example.com/", "num_workers": 8}}"#).unwrap();

        let config = CrawlConfig::from_file(file.path()).unwrap();
        assert_eq!(config.root_url, "https://www.example.com/");
        assert_eq!(config.num_workers, 8);
        assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_from_file_reports_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(CrawlConfig::from_file(file.path()), Err(CrawlError::Json(_))));
    }
}
