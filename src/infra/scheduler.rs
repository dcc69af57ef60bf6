//! Delayed payment completion.
//!
//! Best effort only: tasks live in memory and are aborted on shutdown, so a
//! restart loses any completion that had not fired yet.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::AbortHandle;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Work to run once the delay elapses.
pub type CompletionTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait CompletionScheduler: Send + Sync {
    /// Run `task` after `delay` without blocking the caller.
    fn schedule(&self, key: String, delay: Duration, task: CompletionTask);

    /// Abort everything still waiting; returns how many were cancelled.
    fn shutdown(&self) -> usize;
}

/// Spawns one tokio task per scheduled completion.
#[derive(Clone, Default)]
pub struct TokioCompletionScheduler {
    tasks: Arc<Mutex<HashMap<String, AbortHandle>>>,
}

impl TokioCompletionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completions scheduled and not yet finished.
    pub fn pending(&self) -> usize {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|_, handle| !handle.is_finished());
        tasks.len()
    }
}

impl CompletionScheduler for TokioCompletionScheduler {
    fn schedule(&self, key: String, delay: Duration, task: CompletionTask) {
        let tasks = Arc::clone(&self.tasks);
        let task_key = key.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
            tasks
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&task_key);
        });

        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|_, handle| !handle.is_finished());
        if !handle.is_finished() {
            tasks.insert(key, handle.abort_handle());
        }
    }

    fn shutdown(&self) -> usize {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        let mut aborted = 0;
        for (key, handle) in tasks.drain() {
            if !handle.is_finished() {
                handle.abort();
                aborted += 1;
                tracing::debug!(checkout_request_id = %key, "Pending payment completion aborted");
            }
        }
        aborted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_scheduled_task_runs_after_delay() {
        let scheduler = TokioCompletionScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&counter);

        scheduler.schedule(
            "ws_CO_1".to_string(),
            Duration::from_millis(10),
            Box::pin(async move {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert_eq!(scheduler.pending(), 1);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_aborts_pending_tasks() {
        let scheduler = TokioCompletionScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));

        for i in 0..3 {
            let seen = Arc::clone(&counter);
            scheduler.schedule(
                format!("ws_CO_{}", i),
                Duration::from_secs(60),
                Box::pin(async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }

        assert_eq!(scheduler.shutdown(), 3);
        assert_eq!(scheduler.pending(), 0);
        tokio::task::yield_now().await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
