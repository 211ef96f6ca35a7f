//! Provider bundle trait for simplified type parameters.
//!
//! Engine types would otherwise carry four separate type parameters (time,
//! tasks, transport, store). Bundling them behind one `Providers` trait
//! keeps signatures to a single `P: Providers` while preserving static
//! dispatch.

use crate::{
    SystemTimeProvider, TaskProvider, TimeProvider, TimestampStore, TokioTaskProvider, Transport,
};

/// Bundle of all provider types the engine depends on.
///
/// ## Implementations
///
/// - [`HostProviders`]: wall-clock time and tokio tasks, generic over the
///   host's transport and store.
/// - Test bundles: integration tests assemble their own bundle around a
///   paused-clock time provider and scripted collaborators.
pub trait Providers: Clone + 'static {
    /// Time provider type for sleep, timeout, and time queries.
    type Time: TimeProvider + Clone + 'static;

    /// Task provider type for spawning local tasks.
    type Task: TaskProvider + Clone + 'static;

    /// Transport type for the physical peripheral link.
    type Transport: Transport + Clone + 'static;

    /// Store type for the persisted last-connection timestamp.
    type Store: TimestampStore + Clone + 'static;

    /// Get the time provider instance.
    fn time(&self) -> &Self::Time;

    /// Get the task provider instance.
    fn task(&self) -> &Self::Task;

    /// Get the transport instance.
    fn transport(&self) -> &Self::Transport;

    /// Get the store instance.
    fn store(&self) -> &Self::Store;
}

/// Production bundle: wall-clock time, tokio tasks, host-supplied
/// transport and store.
///
/// Uses [`SystemTimeProvider`] so persisted timestamps stay meaningful
/// across process restarts.
#[derive(Clone)]
pub struct HostProviders<T, S>
where
    T: Transport + Clone + 'static,
    S: TimestampStore + Clone + 'static,
{
    time: SystemTimeProvider,
    task: TokioTaskProvider,
    transport: T,
    store: S,
}

impl<T, S> HostProviders<T, S>
where
    T: Transport + Clone + 'static,
    S: TimestampStore + Clone + 'static,
{
    /// Create a production bundle around the host's transport and store.
    pub fn new(transport: T, store: S) -> Self {
        Self {
            time: SystemTimeProvider::new(),
            task: TokioTaskProvider::new(),
            transport,
            store,
        }
    }
}

impl<T, S> Providers for HostProviders<T, S>
where
    T: Transport + Clone + 'static,
    S: TimestampStore + Clone + 'static,
{
    type Time = SystemTimeProvider;
    type Task = TokioTaskProvider;
    type Transport = T;
    type Store = S;

    fn time(&self) -> &Self::Time {
        &self.time
    }

    fn task(&self) -> &Self::Task {
        &self.task
    }

    fn transport(&self) -> &Self::Transport {
        &self.transport
    }

    fn store(&self) -> &Self::Store {
        &self.store
    }
}
