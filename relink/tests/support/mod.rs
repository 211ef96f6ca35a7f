//! Shared test doubles and runtime setup for integration tests.
//!
//! All timing tests run under tokio's paused clock on a current-thread
//! runtime with a `LocalSet`, so multi-minute schedules execute in
//! milliseconds and attempt times can be asserted exactly.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use relink_core::{
    HardwareAddress, MemoryTimestampStore, Providers, StoreError, StoreResult, TimeProvider,
    TimestampStore, TokioTaskProvider, TokioTimeProvider, Transport, TransportError,
    TransportResult,
};

/// Address used by every test.
pub const ADDRESS: &str = "AA:BB:CC:DD:EE:FF";

/// Run a future on a paused-clock current-thread runtime inside a LocalSet.
pub fn run_local<F: Future>(future: F) -> F::Output {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .expect("failed to build runtime");
    let local = tokio::task::LocalSet::new();
    local.block_on(&rt, future)
}

#[derive(Default)]
struct MockInner {
    /// Failures to serve before connects start succeeding again.
    failures_remaining: Cell<u32>,
    /// When set, every connect fails regardless of the counter.
    always_fail: Cell<bool>,
    /// How long each connect takes before resolving.
    connect_delay: Cell<Duration>,
    authorized: Cell<bool>,
    connected: Cell<bool>,
    /// Time of every connect attempt, successful or not.
    attempt_times: RefCell<Vec<Duration>>,
    /// Items handed out by `retrieve`, one per call.
    retrieve_items: RefCell<VecDeque<String>>,
    disconnect_calls: Cell<u32>,
}

/// Scripted transport double.
///
/// Shares state across clones so tests can adjust behavior while the
/// engine holds its own clone. Records the exact time of every connect
/// attempt for spacing and cadence assertions.
#[derive(Clone)]
pub struct MockTransport {
    time: TokioTimeProvider,
    inner: Rc<MockInner>,
}

impl MockTransport {
    pub fn new(time: TokioTimeProvider) -> Self {
        let inner = MockInner::default();
        inner.authorized.set(true);
        Self {
            time,
            inner: Rc::new(inner),
        }
    }

    /// Serve this many connect failures, then succeed.
    pub fn set_failures(&self, count: u32) {
        self.inner.failures_remaining.set(count);
    }

    /// Make every connect fail until cleared.
    pub fn set_always_fail(&self, fail: bool) {
        self.inner.always_fail.set(fail);
    }

    /// Make every connect take this long to resolve, simulating a slow
    /// radio. The caller's timeout may cancel the attempt mid-delay.
    pub fn set_connect_delay(&self, delay: Duration) {
        self.inner.connect_delay.set(delay);
    }

    pub fn set_authorized(&self, authorized: bool) {
        self.inner.authorized.set(authorized);
    }

    /// Force the liveness answer, simulating an out-of-band drop.
    pub fn set_connected(&self, connected: bool) {
        self.inner.connected.set(connected);
    }

    /// Queue an item for the next `retrieve` call.
    pub fn push_data(&self, item: &str) {
        self.inner
            .retrieve_items
            .borrow_mut()
            .push_back(item.to_string());
    }

    pub fn attempt_times(&self) -> Vec<Duration> {
        self.inner.attempt_times.borrow().clone()
    }

    pub fn disconnect_calls(&self) -> u32 {
        self.inner.disconnect_calls.get()
    }
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn request_authorization(&self) -> TransportResult<bool> {
        Ok(self.inner.authorized.get())
    }

    async fn connect(&self, _address: &HardwareAddress) -> TransportResult<()> {
        self.inner.attempt_times.borrow_mut().push(self.time.now());
        let delay = self.inner.connect_delay.get();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.inner.always_fail.get() {
            return Err(TransportError::ConnectFailed("scripted failure".into()));
        }
        let remaining = self.inner.failures_remaining.get();
        if remaining > 0 {
            self.inner.failures_remaining.set(remaining - 1);
            return Err(TransportError::ConnectFailed("scripted failure".into()));
        }
        self.inner.connected.set(true);
        Ok(())
    }

    async fn disconnect(&self, _address: &HardwareAddress) -> TransportResult<()> {
        self.inner.disconnect_calls.set(self.inner.disconnect_calls.get() + 1);
        self.inner.connected.set(false);
        Ok(())
    }

    async fn is_connected(&self, _address: &HardwareAddress) -> bool {
        self.inner.connected.get()
    }

    async fn retrieve(&self, _address: &HardwareAddress) -> TransportResult<Option<String>> {
        Ok(self.inner.retrieve_items.borrow_mut().pop_front())
    }
}

/// Store double that can be scripted to fail.
///
/// Wraps the in-memory store; failures are toggled per direction so tests
/// can exercise the degraded read path and the non-fatal write path
/// independently.
#[derive(Clone, Default)]
pub struct FlakyStore {
    inner: MemoryTimestampStore,
    fail_reads: Rc<Cell<bool>>,
    fail_writes: Rc<Cell<bool>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Read the underlying value directly, bypassing scripted failures.
    pub async fn raw_value(&self) -> Option<Duration> {
        self.inner.get_last_connection().await.expect("memory store")
    }
}

#[async_trait(?Send)]
impl TimestampStore for FlakyStore {
    async fn set_last_connection(&self, timestamp: Duration) -> StoreResult<()> {
        if self.fail_writes.get() {
            return Err(StoreError::Write("scripted failure".into()));
        }
        self.inner.set_last_connection(timestamp).await
    }

    async fn get_last_connection(&self) -> StoreResult<Option<Duration>> {
        if self.fail_reads.get() {
            return Err(StoreError::Read("scripted failure".into()));
        }
        self.inner.get_last_connection().await
    }
}

/// Test provider bundle: paused-clock time, local tasks, scripted
/// transport, and a swappable store.
#[derive(Clone)]
pub struct TestProviders<S = MemoryTimestampStore>
where
    S: TimestampStore + Clone + 'static,
{
    pub time: TokioTimeProvider,
    pub task: TokioTaskProvider,
    pub transport: MockTransport,
    pub store: S,
}

impl TestProviders<MemoryTimestampStore> {
    /// Bundle with an empty in-memory store. Must be constructed inside
    /// the paused runtime so the time epoch matches the test clock.
    pub fn new() -> Self {
        Self::with_store(MemoryTimestampStore::new())
    }
}

impl<S> TestProviders<S>
where
    S: TimestampStore + Clone + 'static,
{
    pub fn with_store(store: S) -> Self {
        let time = TokioTimeProvider::new();
        Self {
            transport: MockTransport::new(time.clone()),
            task: TokioTaskProvider::new(),
            time,
            store,
        }
    }
}

impl<S> Providers for TestProviders<S>
where
    S: TimestampStore + Clone + 'static,
{
    type Time = TokioTimeProvider;
    type Task = TokioTaskProvider;
    type Transport = MockTransport;
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

/// Drain any events already queued, returning them.
pub fn drain_events(events: &mut relink::EventReceiver) -> Vec<relink::LinkEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}
