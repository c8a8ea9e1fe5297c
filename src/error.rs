// src/error.rs
// =============================================================================
// Error types for the crawl engine.
//
// Two layers:
// - FetchError: what can go wrong while downloading a single page
// - CrawlError: what can make the whole crawl fail (bad root URL, bad config,
//   an unrecovered fetch failure, a worker that panicked)
//
// Worker cancellation is NOT an error. It is how a finished crawl stops its
// workers, so it never shows up in these enums.
// =============================================================================

use std::io;

use thiserror::Error;

/// Result type alias for crawl operations.
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Failure to fetch one page.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {0}")]
    Status(u16),

    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other transport or body decoding error.
    #[error("request failed: {0}")]
    Transport(String),
}

/// Failure of the crawl as a whole.
#[derive(Error, Debug)]
pub enum CrawlError {
    /// The root URL could not be parsed.
    #[error("invalid root URL '{url}': {source}")]
    InvalidRootUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The root URL is not an http(s) URL with a host.
    #[error("root URL must be an http or https URL with a host: {0}")]
    UnsupportedRootUrl(String),

    /// The configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading the config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Decoding the config file failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Building the HTTP client failed.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// A page fetch failed and the crawl is configured to stop on failure.
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    /// A worker task panicked.
    #[error("worker task panicked: {0}")]
    WorkerPanicked(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = CrawlError::Fetch {
            url: "http://example.com/a.html".to_string(),
            source: FetchError::Status(404),
        };
        assert_eq!(err.to_string(), "failed to fetch http://example.com/a.html: HTTP 404");
    }

    #[test]
    fn test_invalid_root_display_names_url() {
        let source = url::Url::parse("not a url").unwrap_err();
        let err = CrawlError::InvalidRootUrl {
            url: "not a url".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("invalid root URL 'not a url'"));
    }
}
