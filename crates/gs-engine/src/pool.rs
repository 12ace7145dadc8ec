//! Bounded worker pools for the asynchronous handlers

use gs_core::ActionError;
use indexmap::IndexMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::{AbortHandle, JoinHandle};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

/// How long interrupted tasks get to wind down before being aborted
const INTERRUPT_GRACE: Duration = Duration::from_millis(50);

/// What happened to in-flight work during shutdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Tasks that finished on their own
    pub completed: usize,
    /// Tasks that were aborted after the timeout
    pub aborted: usize,
}

impl ShutdownReport {
    pub fn merge(self, other: ShutdownReport) -> ShutdownReport {
        ShutdownReport {
            completed: self.completed + other.completed,
            aborted: self.aborted + other.aborted,
        }
    }
}

/// A named pool of tokio tasks with a concurrency limit
///
/// Tasks beyond the limit wait for a permit. Once shutdown has started the
/// pool rejects new work with [`ActionError::PoolShutdown`].
#[derive(Clone)]
pub struct WorkerPool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    name: String,
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    running: Mutex<IndexMap<u64, AbortHandle>>,
    next_id: AtomicU64,
    interrupt: CancellationToken,
}

impl WorkerPool {
    /// Create a pool running at most `workers` tasks at once
    ///
    /// `interrupt` is cancelled when shutdown times out, so paced work can
    /// stop early before the remaining tasks are aborted.
    pub fn new(name: impl Into<String>, workers: usize, interrupt: CancellationToken) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                name: name.into(),
                permits: Arc::new(Semaphore::new(workers.max(1))),
                tracker: TaskTracker::new(),
                running: Mutex::new(IndexMap::new()),
                next_id: AtomicU64::new(0),
                interrupt,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Whether shutdown has started
    pub fn is_shut_down(&self) -> bool {
        self.inner.tracker.is_closed()
    }

    /// Tasks running or waiting for a permit
    pub fn in_flight(&self) -> usize {
        self.inner.tracker.len()
    }

    /// Run `future` on the pool
    pub fn spawn<F, T>(&self, future: F) -> Result<JoinHandle<T>, ActionError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        if self.is_shut_down() {
            return Err(ActionError::PoolShutdown {
                pool: self.inner.name.clone(),
            });
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let inner = self.inner.clone();
        let permits = self.inner.permits.clone();

        let handle = self.inner.tracker.spawn(async move {
            // The semaphore is never closed, so acquiring only waits
            let _permit = permits.acquire_owned().await.ok();
            let output = future.await;
            inner.lock_running().shift_remove(&id);
            output
        });

        self.inner.lock_running().insert(id, handle.abort_handle());
        if handle.is_finished() {
            self.inner.lock_running().shift_remove(&id);
        }

        Ok(handle)
    }

    /// Stop accepting work, wait up to `timeout`, then abort what is left
    pub async fn shutdown(&self, timeout: Duration) -> ShutdownReport {
        let inner = &self.inner;
        inner.tracker.close();

        let in_flight = inner.tracker.len();
        debug!(pool = %inner.name, in_flight, "Shutting down worker pool");

        if tokio::time::timeout(timeout, inner.tracker.wait()).await.is_ok() {
            return ShutdownReport {
                completed: in_flight,
                aborted: 0,
            };
        }

        inner.interrupt.cancel();
        let _ = tokio::time::timeout(INTERRUPT_GRACE, inner.tracker.wait()).await;

        let remaining: Vec<AbortHandle> = inner
            .lock_running()
            .drain(..)
            .map(|(_, handle)| handle)
            .collect();
        for handle in &remaining {
            handle.abort();
        }
        inner.tracker.wait().await;

        let aborted = remaining.len();
        if aborted > 0 {
            warn!(pool = %inner.name, aborted, "Aborted tasks that outlived the shutdown timeout");
        }

        ShutdownReport {
            completed: in_flight.saturating_sub(aborted),
            aborted,
        }
    }
}

impl PoolInner {
    fn lock_running(&self) -> std::sync::MutexGuard<'_, IndexMap<u64, AbortHandle>> {
        self.running
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.inner.name)
            .field("in_flight", &self.in_flight())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}
