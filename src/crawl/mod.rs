// src/crawl/mod.rs
// =============================================================================
// This module runs a whole crawl.
//
// Features:
// - Breadth-first crawling starting from a root URL
// - Same-site only (links to other hosts are never followed)
// - N concurrent workers sharing one frontier
// - Every page is fetched at most once
// - Stops by itself once no unvisited links remain
//
// Wiring:
// 1. Seed the frontier with the canonical root URL
// 2. Spawn the workers into a JoinSet
// 3. Run the termination monitor next to them
// 4. When the monitor sees convergence it cancels the workers; if a worker
//    fails first (fail-fast mode) the rest are cancelled and the error returned
// =============================================================================

mod monitor;
mod queue;
mod worker;

pub use monitor::{monitor, WorkerHandle};
pub use queue::Frontier;
pub use worker::{PageCounters, Worker, WorkerState, WorkerStatus};

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::info;
use tokio::task::{JoinError, JoinSet};

use crate::config::CrawlConfig;
use crate::error::{CrawlError, Result};
use crate::fetch::{HttpFetcher, PageFetcher};
use crate::links::canonicalize_root;
use crate::output::OutputSink;

/// What a converged crawl did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Pages fetched and reported to the sink
    pub pages_processed: usize,
    /// Pages whose fetch failed and were skipped
    pub pages_failed: usize,
    /// Distinct URLs ever queued, the root included
    pub urls_discovered: usize,
    pub elapsed: Duration,
}

// Crawls `root_url` over HTTP with `worker_count` workers
//
// Returns once every reachable same-site page has been processed and all
// workers have been stopped.
pub async fn run_crawl(
    root_url: &str,
    worker_count: usize,
    sink: Arc<dyn OutputSink>,
) -> Result<CrawlSummary> {
    let config = CrawlConfig::new(root_url).with_num_workers(worker_count);
    let fetcher = Arc::new(HttpFetcher::new(&config)?);
    run_crawl_with(&config, fetcher, sink).await
}

// Crawls with an explicit configuration and page fetcher
pub async fn run_crawl_with(
    config: &CrawlConfig,
    fetcher: Arc<dyn PageFetcher>,
    sink: Arc<dyn OutputSink>,
) -> Result<CrawlSummary> {
    config.validate()?;
    let root = canonicalize_root(&config.root_url)?;

    let started = Instant::now();
    let frontier = Arc::new(Frontier::new());
    frontier.seed(root.as_str());
    let counters = Arc::new(PageCounters::default());

    info!("Crawling {} with {} workers", root, config.num_workers);

    let mut workers = JoinSet::new();
    let mut handles = Vec::with_capacity(config.num_workers);
    for id in 0..config.num_workers {
        let worker = Worker::new(
            id,
            frontier.clone(),
            fetcher.clone(),
            sink.clone(),
            counters.clone(),
            config.fail_fast,
        );
        let status = worker.status();
        let abort = workers.spawn(worker.run());
        handles.push(WorkerHandle::new(status, abort));
    }

    // A worker only finishes on its own when it failed
    let outcome = tokio::select! {
        _ = monitor(&frontier, &handles, config.poll_interval()) => Ok(()),
        Some(joined) = workers.join_next() => worker_exit(joined),
    };

    // Stop whatever is still running and wait until it has stopped
    workers.abort_all();
    let mut drained = Ok(());
    while let Some(joined) = workers.join_next().await {
        if let Err(e) = worker_exit(joined) {
            if drained.is_ok() {
                drained = Err(e);
            }
        }
    }
    outcome?;
    drained?;

    let summary = CrawlSummary {
        pages_processed: counters.processed(),
        pages_failed: counters.failed(),
        urls_discovered: frontier.seen_count(),
        elapsed: started.elapsed(),
    };
    info!(
        "Crawl of {} finished: {} pages, {} failed, in {:.2}s",
        root,
        summary.pages_processed,
        summary.pages_failed,
        summary.elapsed.as_secs_f64()
    );
    Ok(summary)
}

// Cancellation is how workers are meant to stop; everything else is a failure
fn worker_exit(joined: std::result::Result<Result<()>, JoinError>) -> Result<()> {
    match joined {
        Ok(result) => result,
        Err(e) if e.is_cancelled() => Ok(()),
        Err(e) => Err(CrawlError::WorkerPanicked(e.to_string())),
    }
}
