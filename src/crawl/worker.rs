// src/crawl/worker.rs
// =============================================================================
// A worker is one fetch slot of the crawl. It loops forever:
//
//   Idle ──pop──> Fetching ──fetch done──> Processing ──mark_done──> Idle
//
// Per URL it:
// 1. pops the URL from the frontier              (Idle -> Fetching)
// 2. fetches the page                            (-> Processing)
// 3. extracts the in-scope links (none for non-HTML pages)
// 4. reports (page, links) to the output sink, exactly once
// 5. offers every link to the frontier, in sorted order
// 6. marks the URL done                          (-> Idle)
//
// A worker never stops by itself. The termination monitor cancels it once
// every worker is Idle and nothing is left to fetch.
// =============================================================================

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, warn};
use url::Url;

use super::queue::Frontier;
use crate::error::{CrawlError, Result};
use crate::fetch::{Page, PageFetcher};
use crate::links::extract_links;
use crate::output::OutputSink;

/// What a worker is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    /// Waiting for the frontier to hand out a URL
    Idle = 0,
    /// Waiting for the page fetcher
    Fetching = 1,
    /// Extracting links and queueing them
    Processing = 2,
}

impl WorkerState {
    // Anything but 0 counts as busy, so a stray value can never look idle
    fn from_u8(value: u8) -> Self {
        match value {
            0 => WorkerState::Idle,
            1 => WorkerState::Fetching,
            _ => WorkerState::Processing,
        }
    }
}

/// A worker's state, readable by the monitor while the worker runs.
#[derive(Debug)]
pub struct WorkerStatus(AtomicU8);

impl WorkerStatus {
    pub fn new() -> Self {
        Self(AtomicU8::new(WorkerState::Idle as u8))
    }

    pub fn get(&self) -> WorkerState {
        WorkerState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, state: WorkerState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

impl Default for WorkerStatus {
    fn default() -> Self {
        Self::new()
    }
}

// Page counts shared by all workers, reported in the crawl summary
#[derive(Debug, Default)]
pub struct PageCounters {
    processed: AtomicUsize,
    failed: AtomicUsize,
}

impl PageCounters {
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }
}

pub struct Worker {
    id: usize,
    frontier: Arc<Frontier>,
    fetcher: Arc<dyn PageFetcher>,
    sink: Arc<dyn OutputSink>,
    status: Arc<WorkerStatus>,
    counters: Arc<PageCounters>,
    fail_fast: bool,
}

impl Worker {
    pub fn new(
        id: usize,
        frontier: Arc<Frontier>,
        fetcher: Arc<dyn PageFetcher>,
        sink: Arc<dyn OutputSink>,
        counters: Arc<PageCounters>,
        fail_fast: bool,
    ) -> Self {
        Self {
            id,
            frontier,
            fetcher,
            sink,
            status: Arc::new(WorkerStatus::new()),
            counters,
            fail_fast,
        }
    }

    /// Handle the monitor uses to observe this worker
    pub fn status(&self) -> Arc<WorkerStatus> {
        self.status.clone()
    }

    // Processes URLs until the task is cancelled
    //
    // Only returns on an unrecovered fetch failure (fail-fast mode).
    pub async fn run(self) -> Result<()> {
        loop {
            self.process_next().await?;
        }
    }

    // Pops one URL and takes it all the way through to mark_done
    pub async fn process_next(&self) -> Result<()> {
        let url = self.frontier.pop(&self.status).await;
        debug!("Worker {} fetching {}", self.id, url);

        let fetched = self.fetcher.fetch(&url).await;
        self.status.set(WorkerState::Processing);

        match fetched {
            Ok(page) => {
                let links = self.page_links(&url, &page);
                self.sink.page_links(&url, &links);

                // BTreeSet iterates in sorted order
                for link in &links {
                    self.frontier.enqueue_if_new(link);
                }
                self.counters.processed.fetch_add(1, Ordering::Relaxed);
            }
            Err(source) => {
                if self.fail_fast {
                    return Err(CrawlError::Fetch { url, source });
                }
                warn!("Failed to fetch {}: {}", url, source);
                self.sink.page_failed(&url, &source);
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
            }
        }

        self.frontier.mark_done(&self.status);
        Ok(())
    }

    fn page_links(&self, url: &str, page: &Page) -> BTreeSet<String> {
        if !page.is_html() {
            debug!("Skipping non-HTML page {} ({})", url, page.content_type);
            return BTreeSet::new();
        }

        // Frontier URLs are canonical, so this only fails for a bad seed
        match Url::parse(url) {
            Ok(page_url) => extract_links(&page_url, &page.body),
            Err(e) => {
                warn!("Cannot extract links from {}: {}", url, e);
                BTreeSet::new()
            }
        }
    }
}
