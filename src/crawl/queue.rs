// src/crawl/queue.rs
// =============================================================================
// This module implements the crawl frontier: the shared queue of URLs still
// to fetch, plus the set of every URL ever queued.
//
// How it works:
// 1. enqueue_if_new(url) checks the seen set and pushes only unseen URLs
// 2. pop() hands the oldest queued URL to a worker, waiting if none is queued
// 3. mark_done() is called once the worker has queued that page's links
//
// Because step 1 is a single locked check-and-insert, no URL is ever queued
// (and so never fetched) twice. The seen set only grows.
//
// Worker states are written here too. pop() flips a worker to Fetching in the
// same critical section that removes the URL, and mark_done() flips it back to
// Idle. A reader holding the lock (is_exhausted) therefore always sees a
// consistent picture: an Idle worker really holds no URL.
//
// Rust concepts:
// - HashSet: To track seen URLs (O(1) lookup)
// - VecDeque: FIFO queue, push_back() / pop_front()
// - Mutex + Notify: Safe sharing between tasks, and waking a waiting worker
// =============================================================================

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::debug;
use tokio::sync::Notify;

use super::worker::{WorkerState, WorkerStatus};

#[derive(Debug, Default)]
struct FrontierState {
    // URLs waiting to be fetched, oldest first
    queue: VecDeque<String>,
    // Every URL ever pushed onto the queue
    seen: HashSet<String>,
    // Pushed but not yet marked done (queued + in flight)
    outstanding: usize,
}

/// Concurrency-safe frontier queue with its dedup set.
#[derive(Debug, Default)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    available: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    // Never held across an await, and no code panics while holding it,
    // so a poisoned lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Puts the crawl's first URL on an empty frontier
    //
    // Returns: false if the frontier already held URLs, nothing is queued then
    pub fn seed(&self, url: &str) -> bool {
        {
            let mut state = self.lock();
            if !state.seen.is_empty() {
                return false;
            }
            state.seen.insert(url.to_string());
            state.queue.push_back(url.to_string());
            state.outstanding = 1;
        }

        debug!("Seeded {}", url);
        self.available.notify_one();
        true
    }

    // Queues `url` unless it has been queued before
    //
    // Returns: true if the URL was new and has been queued
    pub fn enqueue_if_new(&self, url: &str) -> bool {
        {
            let mut state = self.lock();
            if state.seen.contains(url) {
                return false;
            }
            state.seen.insert(url.to_string());
            state.queue.push_back(url.to_string());
            state.outstanding += 1;
        }

        debug!("Queued {}", url);
        self.available.notify_one();
        true
    }

    // Takes the next URL, waiting until one is queued
    //
    // The worker's status becomes Fetching as the URL leaves the queue.
    // Cancel-safe: if the task is aborted while waiting, nothing was taken.
    pub async fn pop(&self, status: &WorkerStatus) -> String {
        loop {
            // Register interest before checking, so a push that lands
            // between the check and the await still wakes us.
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(url) = state.queue.pop_front() {
                    status.set(WorkerState::Fetching);
                    // Another worker may be waiting and there may be more
                    if !state.queue.is_empty() {
                        self.available.notify_one();
                    }
                    return url;
                }
            }

            notified.await;
        }
    }

    // Finishes the item the worker last popped; the worker becomes Idle
    pub fn mark_done(&self, status: &WorkerStatus) {
        let mut state = self.lock();
        state.outstanding = state.outstanding.saturating_sub(1);
        status.set(WorkerState::Idle);
    }

    // Whether the crawl has converged: nothing queued and every worker
    // observed Idle in the same instant. Idle is only ever set here under
    // the lock, so an Idle worker holds no popped URL.
    pub fn is_exhausted<'a, I>(&self, statuses: I) -> bool
    where
        I: IntoIterator<Item = &'a WorkerStatus>,
    {
        let state = self.lock();
        state.queue.is_empty()
            && statuses
                .into_iter()
                .all(|status| status.get() == WorkerState::Idle)
    }

    /// Items pushed and not yet marked done
    pub fn outstanding(&self) -> usize {
        self.lock().outstanding
    }

    /// Number of distinct URLs ever queued
    pub fn seen_count(&self) -> usize {
        self.lock().seen.len()
    }

    #[cfg(test)]
    pub(crate) fn has_seen(&self, url: &str) -> bool {
        self.lock().seen.contains(url)
    }

    /// Snapshot of the queued URLs, oldest first
    #[cfg(test)]
    pub(crate) fn queued(&self) -> Vec<String> {
        self.lock().queue.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_enqueue_if_new_dedups() {
        let frontier = Frontier::new();
        assert!(frontier.enqueue_if_new("http://h/index.html"));
        assert!(frontier.enqueue_if_new("http://h/a.html"));
        assert!(!frontier.enqueue_if_new("http://h/index.html"));

        assert_eq!(frontier.queued(), vec!["http://h/index.html", "http://h/a.html"]);
        assert_eq!(frontier.seen_count(), 2);
        assert_eq!(frontier.outstanding(), 2);
    }

    #[tokio::test]
    async fn test_pop_is_fifo_and_sets_fetching() {
        let frontier = Frontier::new();
        let status = WorkerStatus::new();
        frontier.enqueue_if_new("http://h/1.html");
        frontier.enqueue_if_new("http://h/2.html");

        assert_eq!(frontier.pop(&status).await, "http://h/1.html");
        assert_eq!(status.get(), WorkerState::Fetching);
        assert_eq!(frontier.pop(&status).await, "http://h/2.html");
    }

    #[tokio::test]
    async fn test_popped_url_is_never_requeued() {
        let frontier = Frontier::new();
        let status = WorkerStatus::new();
        frontier.enqueue_if_new("http://h/1.html");
        frontier.pop(&status).await;
        frontier.mark_done(&status);

        assert!(!frontier.enqueue_if_new("http://h/1.html"));
        assert!(frontier.queued().is_empty());
        assert!(frontier.has_seen("http://h/1.html"));
    }

    #[tokio::test]
    async fn test_pop_waits_for_push() {
        let frontier = Arc::new(Frontier::new());
        let status = Arc::new(WorkerStatus::new());

        let waiter = {
            let frontier = frontier.clone();
            let status = status.clone();
            tokio::spawn(async move { frontier.pop(&status).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        frontier.enqueue_if_new("http://h/late.html");
        let url = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("pop should wake up after a push")
            .unwrap();
        assert_eq!(url, "http://h/late.html");
    }

    #[tokio::test]
    async fn test_exhaustion_requires_idle_workers_and_empty_queue() {
        let frontier = Frontier::new();
        let status = WorkerStatus::new();

        assert!(frontier.is_exhausted([&status]));

        frontier.enqueue_if_new("http://h/1.html");
        assert!(!frontier.is_exhausted([&status]));

        frontier.pop(&status).await;
        assert!(!frontier.is_exhausted([&status]));

        status.set(WorkerState::Processing);
        assert!(!frontier.is_exhausted([&status]));

        frontier.mark_done(&status);
        assert_eq!(frontier.outstanding(), 0);
        assert!(frontier.is_exhausted([&status]));
    }

    #[test]
    fn test_seed_only_fills_an_empty_frontier() {
        let frontier = Frontier::new();
        assert!(frontier.seed("http://h/"));
        assert!(!frontier.seed("http://h/other.html"));

        assert_eq!(frontier.queued(), vec!["http://h/"]);
        assert_eq!(frontier.outstanding(), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_depends_only_on_queue_and_states() {
        // A fail-fast worker returns without mark_done, so the count stays up
        let frontier = Frontier::new();
        let worker = WorkerStatus::new();
        frontier.seed("http://h/");
        frontier.pop(&worker).await;

        worker.set(WorkerState::Processing);
        assert!(!frontier.is_exhausted([&worker]));

        worker.set(WorkerState::Idle);
        assert_eq!(frontier.outstanding(), 1);
        assert!(frontier.is_exhausted([&worker]));
    }
}
