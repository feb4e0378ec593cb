//! Tracked spawning of per-request tasks.
//!
//! Work that outlives a single loop iteration (one skill request waiting for
//! its signature, for example) is spawned through a [`TaskSpawner`] instead
//! of a bare `tokio::spawn`. The spawner:
//!
//! - instruments each task with a tracing span carrying its id and name
//! - keeps a registry of running tasks and completion counters
//! - catches panics so a failing request never takes the process down
//! - lets shutdown wait for outstanding tasks for a grace period and then
//!   abandon whatever is left

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::FutureExt;
use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

/// Metadata of a running task.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    /// Unique task ID.
    pub id: Uuid,
    /// Human-readable task name.
    pub name: String,
    /// Spawn timestamp.
    pub spawned_at: chrono::DateTime<chrono::Utc>,
}

struct TaskEntry {
    info: TaskInfo,
    abort: Option<AbortHandle>,
}

#[derive(Default)]
struct SpawnerInner {
    tasks: DashMap<Uuid, TaskEntry>,
    total_spawned: AtomicU64,
    total_completed: AtomicU64,
    total_failed: AtomicU64,
    total_abandoned: AtomicU64,
}

impl SpawnerInner {
    fn mark_completed(&self, id: Uuid) {
        self.tasks.remove(&id);
        self.total_completed.fetch_add(1, Ordering::SeqCst);
    }

    fn mark_failed(&self, id: Uuid) {
        self.tasks.remove(&id);
        self.total_failed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Spawner metrics snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnerMetrics {
    pub total_spawned: u64,
    pub total_completed: u64,
    pub total_failed: u64,
    pub total_abandoned: u64,
    pub active_tasks: usize,
}

/// Handle for spawning tracked tasks. Cheap to clone.
#[derive(Clone)]
pub struct TaskSpawner {
    inner: Arc<SpawnerInner>,
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl TaskSpawner {
    /// Create a spawner tied to the given cancellation token.
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            inner: Arc::new(SpawnerInner::default()),
            tracker: TaskTracker::new(),
            cancel,
        }
    }

    /// Token observed by the spawned tasks.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Spawn a tracked task and return its id.
    pub fn spawn<F>(&self, name: impl Into<String>, future: F) -> Uuid
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = Uuid::new_v4();
        let name = name.into();

        if self.cancel.is_cancelled() {
            warn!(task_id = %id, task_name = %name, "Spawning task after cancellation");
        }

        self.inner.tasks.insert(
            id,
            TaskEntry {
                info: TaskInfo {
                    id,
                    name: name.clone(),
                    spawned_at: chrono::Utc::now(),
                },
                abort: None,
            },
        );
        self.inner.total_spawned.fetch_add(1, Ordering::SeqCst);

        let span = tracing::info_span!("task", task_id = %id, task_name = %name);
        debug!(task_id = %id, task_name = %name, "Spawning task");

        let inner = self.inner.clone();
        let handle = self.tracker.spawn(
            async move {
                match AssertUnwindSafe(future).catch_unwind().await {
                    Ok(()) => inner.mark_completed(id),
                    Err(_) => {
                        error!("Task panicked");
                        inner.mark_failed(id);
                    }
                }
            }
            .instrument(span),
        );

        // The task may already have finished and removed its entry.
        if let Some(mut entry) = self.inner.tasks.get_mut(&id) {
            entry.abort = Some(handle.abort_handle());
        }

        id
    }

    /// Currently running tasks.
    pub fn active_tasks(&self) -> Vec<TaskInfo> {
        self.inner
            .tasks
            .iter()
            .map(|entry| entry.value().info.clone())
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.inner.tasks.len()
    }

    /// Metrics snapshot.
    pub fn metrics(&self) -> SpawnerMetrics {
        SpawnerMetrics {
            total_spawned: self.inner.total_spawned.load(Ordering::SeqCst),
            total_completed: self.inner.total_completed.load(Ordering::SeqCst),
            total_failed: self.inner.total_failed.load(Ordering::SeqCst),
            total_abandoned: self.inner.total_abandoned.load(Ordering::SeqCst),
            active_tasks: self.inner.tasks.len(),
        }
    }

    /// Wait up to `grace` for running tasks, then abort the rest.
    ///
    /// Returns the number of abandoned tasks.
    pub async fn shutdown(&self, grace: Duration) -> usize {
        self.tracker.close();

        if tokio::time::timeout(grace, self.tracker.wait()).await.is_ok() {
            debug!("All tracked tasks finished");
            return 0;
        }

        let ids: Vec<Uuid> = self.inner.tasks.iter().map(|e| *e.key()).collect();
        let mut abandoned = 0;
        for id in ids {
            if let Some((_, entry)) = self.inner.tasks.remove(&id) {
                if let Some(abort) = entry.abort {
                    abort.abort();
                }
                warn!(
                    task_id = %id,
                    task_name = %entry.info.name,
                    "Abandoning task at shutdown"
                );
                abandoned += 1;
            }
        }
        self.inner
            .total_abandoned
            .fetch_add(abandoned as u64, Ordering::SeqCst);

        // Aborted tasks finish at their next poll.
        self.tracker.wait().await;
        info!(abandoned, "Tracked tasks shut down");
        abandoned
    }
}

#[cfg(test)]
#[path = "spawner_tests.rs"]
mod tests;
