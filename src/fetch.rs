// src/fetch.rs
// =============================================================================
// This module downloads pages for the crawler.
//
// The crawl engine only knows the PageFetcher trait:
//   fetch(url) -> Page { content_type, body } or a FetchError
//
// HttpFetcher is the real implementation on top of reqwest. Tests plug in
// in-memory fetchers instead, so no test needs the network.
//
// Rust concepts:
// - Traits: PageFetcher is the seam between the engine and the network
// - async-trait: lets a trait have async methods and still be used as
//   Arc<dyn PageFetcher>
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::config::CrawlConfig;
use crate::error::{FetchError, Result};

// A fetched page. Lives only long enough to have its links extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// The declared Content-Type, empty if the server sent none
    pub content_type: String,
    /// The decoded response body
    pub body: String,
}

impl Page {
    pub fn new(content_type: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    /// Whether the page declared itself as HTML
    pub fn is_html(&self) -> bool {
        is_html_content_type(&self.content_type)
    }
}

// Prefix match, so "text/html; charset=utf-8" counts as HTML
pub fn is_html_content_type(content_type: &str) -> bool {
    content_type
        .trim_start()
        .to_ascii_lowercase()
        .starts_with("text/html")
}

/// Something that can download a page.
///
/// Implementations must be safe to call from many workers at once.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> std::result::Result<Page, FetchError>;
}

// Fetches pages over HTTP(S) with a shared reqwest client
//
// The client is reused for every request (connection pooling).
// Redirects are followed with reqwest's default policy.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<Page, FetchError> {
        let response = self.client.get(url).send().await.map_err(categorize_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        // Skip the body download for non-HTML, its links are never read
        if !is_html_content_type(&content_type) {
            return Ok(Page::new(content_type, String::new()));
        }

        let body = response.text().await.map_err(categorize_error)?;
        Ok(Page::new(content_type, body))
    }
}

// Sorts reqwest errors into the kinds the crawl reports
fn categorize_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_connect() {
        FetchError::Connect(error.to_string())
    } else if let Some(status) = error.status() {
        FetchError::Status(status.as_u16())
    } else {
        FetchError::Transport(error.to_string())
    }
}
