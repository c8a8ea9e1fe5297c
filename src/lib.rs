// src/lib.rs
// =============================================================================
// site-crawler: a concurrent, same-site, breadth-first web crawler.
//
// Modules:
// - crawl: frontier queue, workers, termination monitor, run_crawl()
// - links: link extraction and URL canonicalization
// - fetch: the PageFetcher trait and its reqwest implementation
// - output: sinks that report the links found on each page
// - config: crawl settings (defaults, JSON file, builder)
// - error: typed errors
//
// Quick start:
//   let sink = Arc::new(TextSink::stdout());
//   let summary = run_crawl("https://example.com/", 5, sink).await?;
// =============================================================================

pub mod config;
pub mod crawl;
pub mod error;
pub mod fetch;
pub mod links;
pub mod output;

pub use config::CrawlConfig;
pub use crawl::{run_crawl, run_crawl_with, CrawlSummary};
pub use error::{CrawlError, FetchError};
pub use fetch::{HttpFetcher, Page, PageFetcher};
pub use links::extract_links;
pub use output::{JsonSink, OutputSink, TextSink};
