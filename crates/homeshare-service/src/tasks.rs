//! Supervised background work.
//!
//! Work spawned here outlives the request that started it but not the
//! process: shutdown closes the tracker and waits for every task.

use std::future::Future;

use tokio_util::task::TaskTracker;
use tracing::info;

/// A joinable pool of detached tasks.
#[derive(Debug, Clone, Default)]
pub struct BackgroundTasks {
    tracker: TaskTracker,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn(task);
    }

    /// Number of tasks still running.
    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }

    /// Waits for every task spawned so far, then keeps accepting new ones.
    pub async fn wait_idle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Waits for every running task and closes the pool.
    pub async fn shutdown(&self) {
        info!(running = self.tracker.len(), "Waiting for background tasks");
        self.tracker.close();
        self.tracker.wait().await;
        info!("Background tasks finished");
    }
}
