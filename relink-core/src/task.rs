//! Task spawning abstraction for single-threaded cooperative execution.

use async_trait::async_trait;
use std::future::Future;

/// Provider for spawning local tasks in single-threaded context.
///
/// All relink background work (the schedule loop, the liveness monitor)
/// runs as named local tasks. Spawning goes through this trait so a host
/// can substitute its own scheduler while keeping the engine cooperative
/// and lock-free.
#[async_trait(?Send)]
pub trait TaskProvider: Clone {
    /// Spawn a named task that runs on the current thread.
    ///
    /// Uses `spawn_local` semantics: the future need not be `Send`, and
    /// execution stays on the calling thread's local set.
    fn spawn_task<F>(&self, name: &str, future: F) -> tokio::task::JoinHandle<()>
    where
        F: Future<Output = ()> + 'static;

    /// Yield control to allow other tasks to run.
    async fn yield_now(&self);
}

/// Real tokio task provider using `spawn_local`.
///
/// Requires a `LocalSet` (or local runtime) context.
#[derive(Debug, Clone)]
pub struct TokioTaskProvider;

impl TokioTaskProvider {
    /// Create a new tokio task provider.
    pub fn new() -> Self {
        Self
    }
}

impl Default for TokioTaskProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl TaskProvider for TokioTaskProvider {
    fn spawn_task<F>(&self, name: &str, future: F) -> tokio::task::JoinHandle<()>
    where
        F: Future<Output = ()> + 'static,
    {
        let task_name = name.to_string();
        tokio::task::spawn_local(async move {
            tracing::trace!("Task {} starting", task_name);
            future.await;
            tracing::trace!("Task {} completed", task_name);
        })
    }

    async fn yield_now(&self) {
        tokio::task::yield_now().await;
    }
}
