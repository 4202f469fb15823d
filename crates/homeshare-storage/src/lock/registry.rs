//! Non-blocking lock registry keyed by opaque resource names.
//!
//! Holders never wait: [`LockRegistry::acquire`] answers immediately and a
//! `false` means somebody else is already working on the key. Locks that
//! are not touched for `timeout` are evicted by a periodic sweep so an
//! abandoned holder cannot wedge a key forever. Long-running holders keep
//! their lock alive through [`LockGuard::touch`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
struct HeldLock {
    touched: Instant,
    /// Distinguishes successive holders of the same key.
    generation: u64,
}

/// In-memory map from resource key to its current holder.
#[derive(Debug)]
pub struct LockRegistry {
    locks: DashMap<String, HeldLock>,
    next_generation: AtomicU64,
    timeout: Duration,
    shutdown: CancellationToken,
}

impl LockRegistry {
    /// Creates an empty registry whose locks go stale after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            locks: DashMap::new(),
            next_generation: AtomicU64::new(1),
            timeout,
            shutdown: CancellationToken::new(),
        }
    }

    /// Takes the lock for `key` if it is free.
    ///
    /// When the key is already held its last-touch time is refreshed and
    /// `false` is returned.
    pub fn acquire(&self, key: &str) -> bool {
        self.acquire_generation(key).is_some()
    }

    fn acquire_generation(&self, key: &str) -> Option<u64> {
        match self.locks.entry(key.to_string()) {
            Entry::Occupied(mut held) => {
                held.get_mut().touched = Instant::now();
                None
            }
            Entry::Vacant(free) => {
                let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                free.insert(HeldLock {
                    touched: Instant::now(),
                    generation,
                });
                Some(generation)
            }
        }
    }

    /// Drops the lock for `key`. No-op when the key is not held.
    pub fn release(&self, key: &str) {
        self.locks.remove(key);
    }

    /// Acquires `key` and returns a guard that releases it on drop.
    pub fn try_lock(self: &Arc<Self>, key: &str) -> Option<LockGuard> {
        self.acquire_generation(key).map(|generation| LockGuard {
            registry: Arc::clone(self),
            key: key.to_string(),
            generation,
        })
    }

    /// Whether `key` is currently held. Does not refresh the lock.
    pub fn is_held(&self, key: &str) -> bool {
        self.locks.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    /// Evicts every lock idle for longer than the timeout.
    ///
    /// Returns the number of evicted locks.
    pub fn sweep(&self) -> usize {
        let before = self.locks.len();
        let timeout = self.timeout;
        self.locks.retain(|_, held| held.touched.elapsed() <= timeout);
        let evicted = before.saturating_sub(self.locks.len());
        if evicted > 0 {
            info!(evicted, "Evicted stale resource locks");
        }
        evicted
    }

    /// Runs [`sweep`](Self::sweep) every `interval` until [`shutdown`](Self::shutdown).
    ///
    /// `interval` must be non-zero.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        registry.sweep();
                    }
                }
            }
            debug!("Lock sweeper stopped");
        })
    }

    /// Stops the sweeper and forgets every lock.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.locks.clear();
        info!("Lock registry shut down");
    }
}

/// Holds a registry key until dropped.
///
/// A guard only ever touches or releases the entry it created; once the
/// sweep evicts it and another holder takes the key, the old guard is inert.
#[derive(Debug)]
pub struct LockGuard {
    registry: Arc<LockRegistry>,
    key: String,
    generation: u64,
}

impl LockGuard {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Refreshes the lock's last-touch time.
    ///
    /// An evicted lock that nobody has taken since is reclaimed. Returns
    /// `false` when another holder owns the key.
    pub fn touch(&self) -> bool {
        match self.registry.locks.entry(self.key.clone()) {
            Entry::Occupied(mut held) => {
                if held.get().generation != self.generation {
                    return false;
                }
                held.get_mut().touched = Instant::now();
                true
            }
            Entry::Vacant(free) => {
                warn!(key = %self.key, "Reclaimed lock evicted while still in use");
                free.insert(HeldLock {
                    touched: Instant::now(),
                    generation: self.generation,
                });
                true
            }
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.registry
            .locks
            .remove_if(&self.key, |_, held| held.generation == self.generation);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::Barrier;

    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_acquire_has_one_winner() {
        let registry = Arc::new(LockRegistry::new(Duration::from_secs(45)));
        let barrier = Arc::new(Barrier::new(32));
        let winners = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..32 {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            let winners = Arc::clone(&winners);
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                if registry.acquire("transfer-1") {
                    winners.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_acquire_release_acquire() {
        let registry = LockRegistry::new(Duration::from_secs(45));

        assert!(registry.acquire("k"));
        assert!(!registry.acquire("k"));
        registry.release("k");
        assert!(registry.acquire("k"));
        registry.release("missing");
    }

    #[tokio::test]
    async fn test_unrelated_keys_do_not_contend() {
        let registry = LockRegistry::new(Duration::from_secs(45));
        assert!(registry.acquire("a"));
        assert!(registry.acquire("b"));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_evicts_only_stale_locks() {
        let registry = LockRegistry::new(Duration::from_secs(45));
        assert!(registry.acquire("stale"));

        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(registry.acquire("fresh"));

        tokio::time::advance(Duration::from_secs(20)).await;
        assert_eq!(registry.sweep(), 1);

        assert!(registry.acquire("stale"));
        assert!(!registry.acquire("fresh"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_acquire_refreshes_touch_time() {
        let registry = LockRegistry::new(Duration::from_secs(45));
        assert!(registry.acquire("k"));

        tokio::time::advance(Duration::from_secs(40)).await;
        assert!(!registry.acquire("k"));

        tokio::time::advance(Duration::from_secs(40)).await;
        assert_eq!(registry.sweep(), 0);
        assert!(registry.is_held("k"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_sweeper_frees_abandoned_lock() {
        let registry = Arc::new(LockRegistry::new(Duration::from_secs(45)));
        let sweeper = registry.spawn_sweeper(Duration::from_secs(60));
        assert!(registry.acquire("abandoned"));

        tokio::time::sleep(Duration::from_secs(61)).await;

        assert!(!registry.is_held("abandoned"));
        registry.shutdown();
        sweeper.await.unwrap();
    }

    #[tokio::test]
    async fn test_guard_releases_on_drop() {
        let registry = Arc::new(LockRegistry::new(Duration::from_secs(45)));
        {
            let guard = registry.try_lock("k").unwrap();
            assert_eq!(guard.key(), "k");
            assert!(registry.try_lock("k").is_none());
        }
        assert!(registry.try_lock("k").is_some());
    }

    #[tokio::test]
    async fn test_stale_guard_does_not_release_new_holder() {
        let registry = Arc::new(LockRegistry::new(Duration::ZERO));
        let first = registry.try_lock("k").unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(registry.sweep(), 1);
        let second = registry.try_lock("k").unwrap();

        assert!(!first.touch());
        drop(first);
        assert!(registry.is_held("k"));
        assert!(second.touch());

        drop(second);
        assert!(!registry.is_held("k"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_touch_keeps_guard_alive_past_timeout() {
        let registry = Arc::new(LockRegistry::new(Duration::from_secs(45)));
        let guard = registry.try_lock("k").unwrap();

        for _ in 0..4 {
            tokio::time::advance(Duration::from_secs(30)).await;
            assert!(guard.touch());
            assert_eq!(registry.sweep(), 0);
        }
        assert!(registry.try_lock("k").is_none());
    }

    #[tokio::test]
    async fn test_touch_reclaims_evicted_but_free_key() {
        let registry = Arc::new(LockRegistry::new(Duration::ZERO));
        let guard = registry.try_lock("k").unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        registry.sweep();
        assert!(!registry.is_held("k"));

        assert!(guard.touch());
        assert!(registry.try_lock("k").is_none());
    }

    #[tokio::test]
    async fn test_shutdown_clears_locks() {
        let registry = LockRegistry::new(Duration::from_secs(45));
        registry.acquire("a");
        registry.acquire("b");
        registry.shutdown();
        assert!(registry.is_empty());
    }
}
