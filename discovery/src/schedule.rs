//! Bounded concurrency pools for page fetches and subtree builds.
//!
//! Two independent pools gate the crawl: the fetch pool caps outstanding page
//! requests against the documentation server, and the subtree pool caps how
//! many base command trees are built at once. Both are FIFO-fair tokio
//! semaphores, so a queued task waits for a free slot, is never dropped, and
//! starts in submission order.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::debug;

use crate::error::Result;

/// Default bound on concurrent page fetches.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 2;

/// Default bound on concurrently built base command subtrees.
pub const DEFAULT_SUBTREE_CONCURRENCY: usize = 1;

/// Fetch and subtree pools shared by one crawl.
#[derive(Debug, Clone)]
pub struct Scheduler {
    fetch: Arc<Semaphore>,
    subtree: Arc<Semaphore>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_CONCURRENCY, DEFAULT_SUBTREE_CONCURRENCY)
    }
}

impl Scheduler {
    /// Creates the pools; bounds below 1 are raised to 1.
    pub fn new(fetch_bound: usize, subtree_bound: usize) -> Self {
        let fetch_bound = fetch_bound.max(1);
        let subtree_bound = subtree_bound.max(1);
        debug!(fetch_bound, subtree_bound, "Scheduler initialized");
        Self {
            fetch: Arc::new(Semaphore::new(fetch_bound)),
            subtree: Arc::new(Semaphore::new(subtree_bound)),
        }
    }

    /// Runs `task` once a fetch slot is free.
    pub async fn fetch<T, F>(&self, task: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let _permit = self.fetch.acquire().await?;
        task.await
    }

    /// Runs `task` once a subtree slot is free.
    pub async fn subtree<T, F>(&self, task: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let _permit = self.subtree.acquire().await?;
        task.await
    }

    /// Free fetch slots right now.
    pub fn available_fetch_slots(&self) -> usize {
        self.fetch.available_permits()
    }

    /// Free subtree slots right now.
    pub fn available_subtree_slots(&self) -> usize {
        self.subtree.available_permits()
    }
}
