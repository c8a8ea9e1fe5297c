// src/output.rs
// =============================================================================
// This module reports crawl results as pages are processed.
//
// Every worker calls the sink once per page, so a sink is shared between
// tasks and must be Send + Sync. Both built-in sinks take a lock for each
// page, so the lines of two pages never interleave.
//
// Sinks:
// - TextSink: a readable listing, one block per page
// - JsonSink: one JSON object per line (easy to pipe into jq)
// - any closure Fn(&str, &BTreeSet<String>)
// =============================================================================

use std::collections::BTreeSet;
use std::io::{self, Stdout, Write};
use std::sync::{Mutex, PoisonError};

use log::warn;
use serde::Serialize;

use crate::error::FetchError;

/// Receives the links found on every processed page.
pub trait OutputSink: Send + Sync {
    /// Called exactly once per successfully fetched page
    fn page_links(&self, page_url: &str, links: &BTreeSet<String>);

    /// Called when a page could not be fetched and the crawl moved on
    fn page_failed(&self, _page_url: &str, _error: &FetchError) {}
}

impl<F> OutputSink for F
where
    F: Fn(&str, &BTreeSet<String>) + Send + Sync,
{
    fn page_links(&self, page_url: &str, links: &BTreeSet<String>) {
        self(page_url, links)
    }
}

// Prints each page and its links
//
// Example output:
//   Links found on https://example.com/
//     https://example.com/about.html
//     https://example.com/blog/
//
//   No links found on https://example.com/logo.png
//
pub struct TextSink<W: Write + Send = Stdout> {
    out: Mutex<W>,
}

impl TextSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_block(&self, block: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = out.write_all(block.as_bytes()).and_then(|_| out.flush()) {
            warn!("Could not write crawl output: {}", e);
        }
    }
}

impl<W: Write + Send> OutputSink for TextSink<W> {
    fn page_links(&self, page_url: &str, links: &BTreeSet<String>) {
        let mut block = String::new();
        if links.is_empty() {
            block.push_str(&format!("No links found on {}\n", page_url));
        } else {
            block.push_str(&format!("Links found on {}\n", page_url));
            for link in links {
                block.push_str(&format!("  {}\n", link));
            }
        }
        block.push('\n');
        self.write_block(&block);
    }

    fn page_failed(&self, page_url: &str, error: &FetchError) {
        self.write_block(&format!("Failed to fetch {}: {}\n\n", page_url, error));
    }
}

#[derive(Serialize)]
struct PageRecord<'a> {
    page: &'a str,
    links: &'a BTreeSet<String>,
}

#[derive(Serialize)]
struct FailureRecord<'a> {
    page: &'a str,
    error: String,
}

// Writes one JSON object per page:
//   {"page":"https://example.com/","links":["https://example.com/a.html"]}
//   {"page":"https://example.com/gone.html","error":"HTTP 404"}
pub struct JsonSink<W: Write + Send = Stdout> {
    out: Mutex<W>,
}

impl JsonSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_record<T: Serialize>(&self, record: &T) {
        let line = match serde_json::to_string(record) {
            Ok(line) => line,
            Err(e) => {
                warn!("Could not encode crawl output: {}", e);
                return;
            }
        };

        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            warn!("Could not write crawl output: {}", e);
        }
    }
}

impl<W: Write + Send> OutputSink for JsonSink<W> {
    fn page_links(&self, page_url: &str, links: &BTreeSet<String>) {
        self.write_record(&PageRecord { page: page_url, links });
    }

    fn page_failed(&self, page_url: &str, error: &FetchError) {
        self.write_record(&FailureRecord {
            page: page_url,
            error: error.to_string(),
        });
    }
}
