// src/crawl/monitor.rs
// =============================================================================
// The termination monitor decides when the crawl is finished.
//
// Workers never exit on their own: an idle worker just waits for the next
// URL. The crawl is over when every worker is waiting and nothing is queued
// or in flight. The monitor samples that condition every poll interval and,
// once it holds, cancels every worker.
//
// The first check happens only after one interval, so the workers get a
// chance to pick up the seed URL first.
//
// This is a sampler, not a barrier. Workers that keep flickering in and out
// of Idle between samples would delay detection; they cannot cause a false
// positive, because the snapshot is taken under the frontier lock.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::task::AbortHandle;
use tokio::time::sleep;

use super::queue::Frontier;
use super::worker::WorkerStatus;

// What the monitor needs to watch and stop one worker
#[derive(Debug)]
pub struct WorkerHandle {
    pub status: Arc<WorkerStatus>,
    abort: Option<AbortHandle>,
}

impl WorkerHandle {
    pub fn new(status: Arc<WorkerStatus>, abort: AbortHandle) -> Self {
        Self {
            status,
            abort: Some(abort),
        }
    }

    // A handle with nothing to cancel, for observing a worker driven by hand
    #[cfg(test)]
    pub(crate) fn detached(status: Arc<WorkerStatus>) -> Self {
        Self { status, abort: None }
    }

    fn cancel(&self) {
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }
}

// Waits for convergence, then cancels every worker
//
// Parameters:
//   frontier: the shared queue the workers pull from
//   workers: one handle per running worker
//   poll_interval: pause before each check
pub async fn monitor(frontier: &Frontier, workers: &[WorkerHandle], poll_interval: Duration) {
    let mut checks = 0u64;
    loop {
        sleep(poll_interval).await;
        checks += 1;

        if frontier.is_exhausted(workers.iter().map(|w| w.status.as_ref())) {
            break;
        }
        debug!(
            "Crawl still running after {} checks ({} URLs outstanding)",
            checks,
            frontier.outstanding()
        );
    }

    info!("Crawl converged after {} checks, stopping {} workers", checks, workers.len());
    for worker in workers {
        worker.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::worker::WorkerState;
    use tokio::time::timeout;

    const POLL: Duration = Duration::from_millis(10);

    fn handles(count: usize) -> Vec<WorkerHandle> {
        (0..count)
            .map(|_| WorkerHandle::detached(Arc::new(WorkerStatus::new())))
            .collect()
    }

    #[tokio::test]
    async fn test_stops_when_all_workers_idle() {
        let frontier = Frontier::new();
        let workers = handles(3);

        let finished = timeout(Duration::from_secs(1), monitor(&frontier, &workers, POLL)).await;
        assert!(finished.is_ok());
    }

    #[tokio::test]
    async fn test_waits_while_any_worker_busy() {
        for busy in [WorkerState::Fetching, WorkerState::Processing] {
            let frontier = Frontier::new();
            let workers = handles(3);
            workers[1].status.set(busy);

            let finished = timeout(POLL * 10, monitor(&frontier, &workers, POLL)).await;
            assert!(finished.is_err(), "monitor stopped while a worker was {:?}", busy);
        }
    }

    #[tokio::test]
    async fn test_waits_while_urls_queued() {
        let frontier = Frontier::new();
        frontier.enqueue_if_new("http://h/index.html");
        let workers = handles(2);

        let finished = timeout(POLL * 10, monitor(&frontier, &workers, POLL)).await;
        assert!(finished.is_err());
    }

    #[tokio::test]
    async fn test_stops_once_busy_worker_goes_idle() {
        let frontier = Arc::new(Frontier::new());
        let workers = Arc::new(handles(2));
        workers[0].status.set(WorkerState::Fetching);

        let watcher = {
            let frontier = frontier.clone();
            let workers = workers.clone();
            tokio::spawn(async move { monitor(&frontier, &workers, POLL).await })
        };

        sleep(POLL * 5).await;
        assert!(!watcher.is_finished());

        workers[0].status.set(WorkerState::Idle);
        assert!(timeout(Duration::from_secs(1), watcher).await.is_ok());
    }

    #[tokio::test]
    async fn test_cancels_workers_on_convergence() {
        let frontier = Frontier::new();
        let parked = tokio::spawn(std::future::pending::<()>());
        let workers = vec![WorkerHandle::new(
            Arc::new(WorkerStatus::new()),
            parked.abort_handle(),
        )];

        monitor(&frontier, &workers, POLL).await;

        let joined = parked.await;
        assert!(joined.unwrap_err().is_cancelled());
    }
}
