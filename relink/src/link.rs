//! Link orchestration: the public handle tying transport, schedule loop,
//! and liveness monitor together.
//!
//! A [`Link`] owns one managed peripheral at a time. `connect` performs the
//! manual first connection and arms the background cycle; from then on the
//! schedule loop and liveness monitor drive everything until `disconnect`,
//! a detected loss, or `close`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use relink_core::{
    HardwareAddress, Providers, TaskProvider, TimeProvider, TimestampStore, Transport,
    TransportError,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::LinkConfig;
use crate::error::{LinkError, LinkResult};
use crate::events::{EventReceiver, LinkEvent};
use crate::metrics::LinkMetrics;
use crate::monitor;
use crate::retry::RetrySession;
use crate::scheduler::{self, LinkCommand};
use crate::state::{ConnectionState, LinkStatus};

/// State shared between the link handle and its background tasks.
pub(crate) struct LinkShared<P: Providers> {
    pub(crate) time: P::Time,
    pub(crate) transport: P::Transport,
    pub(crate) store: P::Store,
    pub(crate) config: LinkConfig,
    /// Address of the managed peripheral, set by a successful connect.
    pub(crate) address: Option<HardwareAddress>,
    pub(crate) state: ConnectionState,
    pub(crate) connected: bool,
    /// Whether the background cycle should keep running. Cleared by
    /// disconnect and by monitor-detected loss.
    pub(crate) armed: bool,
    pub(crate) retry_session: Option<RetrySession>,
    pub(crate) retry_attempts_total: u64,
    pub(crate) retry_message: Option<String>,
    pub(crate) next_connection_time: Option<Duration>,
    pub(crate) retrieved: Vec<String>,
    pub(crate) metrics: LinkMetrics,
    events_tx: mpsc::UnboundedSender<LinkEvent>,
}

impl<P: Providers> LinkShared<P> {
    /// Publish an event. Observers are optional; a dropped receiver is
    /// not an error.
    pub(crate) fn emit(&self, event: LinkEvent) {
        let _ = self.events_tx.send(event);
    }
}

/// Handle managing the connection lifecycle of one peripheral.
///
/// Single-threaded by design: background tasks are spawned with
/// `spawn_local` semantics and share state through `Rc<RefCell<_>>`.
/// Construct and use a `Link` inside a `LocalSet` or local runtime.
pub struct Link<P: Providers> {
    providers: P,
    shared: Rc<RefCell<LinkShared<P>>>,
    events_rx: Option<EventReceiver>,
    cmd_tx: Option<mpsc::UnboundedSender<LinkCommand>>,
    monitor_shutdown_tx: Option<mpsc::UnboundedSender<()>>,
    scheduler_handle: Option<JoinHandle<()>>,
}

impl<P: Providers> Link<P> {
    /// Create an idle link with the given providers and configuration.
    pub fn new(providers: P, config: LinkConfig) -> LinkResult<Self> {
        config.validate()?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let shared = Rc::new(RefCell::new(LinkShared {
            time: providers.time().clone(),
            transport: providers.transport().clone(),
            store: providers.store().clone(),
            config,
            address: None,
            state: ConnectionState::Idle,
            connected: false,
            armed: false,
            retry_session: None,
            retry_attempts_total: 0,
            retry_message: None,
            next_connection_time: None,
            retrieved: Vec::new(),
            metrics: LinkMetrics::new(),
            events_tx,
        }));
        Ok(Self {
            providers,
            shared,
            events_rx: Some(events_rx),
            cmd_tx: None,
            monitor_shutdown_tx: None,
            scheduler_handle: None,
        })
    }

    /// Connect to the peripheral at `address` and arm the retry cycle.
    ///
    /// The address is validated before any transport call. The single
    /// manual attempt is bounded by `connect_timeout`; on failure the link
    /// returns to idle and nothing is scheduled. On success the connection
    /// time is persisted and the schedule loop and liveness monitor start.
    pub async fn connect(&mut self, address: &str) -> LinkResult<()> {
        let address: HardwareAddress = address.parse()?;
        if self.shared.borrow().armed {
            return Err(LinkError::AlreadyArmed);
        }

        let time = self.providers.time().clone();
        let transport = self.providers.transport().clone();
        let store = self.providers.store().clone();
        let connect_timeout = self.shared.borrow().config.connect_timeout;

        self.shared.borrow_mut().state = ConnectionState::Connecting;
        tracing::debug!("connecting to {}", address);

        match transport.request_authorization().await {
            Ok(true) => {}
            Ok(false) => {
                self.shared.borrow_mut().state = ConnectionState::Idle;
                return Err(LinkError::PermissionDenied);
            }
            Err(e) => {
                self.shared.borrow_mut().state = ConnectionState::Idle;
                return Err(LinkError::ConnectFailed(e));
            }
        }

        self.shared.borrow_mut().metrics.record_connection_attempt();
        let result = time.timeout(connect_timeout, transport.connect(&address)).await;
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let mut s = self.shared.borrow_mut();
                s.state = ConnectionState::Idle;
                s.metrics.record_connection_failure();
                return Err(LinkError::ConnectFailed(e));
            }
            Err(_) => {
                let mut s = self.shared.borrow_mut();
                s.state = ConnectionState::Idle;
                s.metrics.record_connection_failure();
                return Err(LinkError::ConnectFailed(TransportError::ConnectFailed(
                    "timed out".to_string(),
                )));
            }
        }

        // Persist the connection time and pull the first data item.
        // Neither failure unwinds an established connection.
        let now = time.now();
        if let Err(e) = store.set_last_connection(now).await {
            tracing::warn!("failed to persist connection time: {}", e);
        }
        let retrieved = transport.retrieve(&address).await;
        {
            let mut s = self.shared.borrow_mut();
            s.address = Some(address);
            s.armed = true;
            s.connected = true;
            s.state = ConnectionState::Connected;
            s.metrics.record_connection_success();
            match retrieved {
                Ok(Some(item)) => {
                    s.retrieved.push(item.clone());
                    s.emit(LinkEvent::DataRetrieved { item });
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("device data retrieval failed: {}", e),
            }
            s.emit(LinkEvent::Connected { address });
        }
        tracing::debug!("connected to {}, arming retry cycle", address);

        // One schedule loop, one monitor. Arming replaces any previous
        // channels, so at most one timer exists per link.
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (monitor_tx, monitor_rx) = mpsc::unbounded_channel();
        let task = self.providers.task();
        self.scheduler_handle = Some(task.spawn_task(
            "schedule_loop",
            scheduler::schedule_loop(self.shared.clone(), cmd_rx),
        ));
        task.spawn_task(
            "monitor_loop",
            monitor::monitor_loop(self.shared.clone(), cmd_tx.clone(), monitor_rx),
        );
        self.cmd_tx = Some(cmd_tx);
        self.monitor_shutdown_tx = Some(monitor_tx);
        Ok(())
    }

    /// Disconnect from the peripheral and cancel the retry cycle.
    ///
    /// All timers are cancelled and any active retry burst stops, but the
    /// persisted timestamp is left untouched: a later connect derives its
    /// schedule from the last genuine connection.
    pub async fn disconnect(&mut self) -> LinkResult<()> {
        let address = {
            let s = self.shared.borrow();
            if !s.armed {
                return Err(LinkError::NotConnected);
            }
            match s.address {
                Some(address) => address,
                None => return Err(LinkError::NotConnected),
            }
        };

        self.shared.borrow_mut().state = ConnectionState::Disconnecting;
        self.stop_tasks();

        let transport = self.providers.transport().clone();
        let result = transport.disconnect(&address).await;
        {
            let mut s = self.shared.borrow_mut();
            s.armed = false;
            s.connected = false;
            s.retry_session = None;
            s.retry_message = None;
            s.next_connection_time = None;
            s.state = ConnectionState::Idle;
            s.emit(LinkEvent::Disconnected);
        }
        tracing::debug!("disconnected from {}", address);
        result.map_err(LinkError::DisconnectFailed)
    }

    /// Re-evaluate the schedule against the persisted timestamp.
    ///
    /// Intended for process-resume hooks, where timers may have been
    /// suspended while wall-clock time kept moving. A no-op when no link
    /// is armed or while a retry burst is running.
    pub fn check_now(&self) {
        if let Some(tx) = &self.cmd_tx {
            // A closed channel means the cycle already stopped.
            let _ = tx.send(LinkCommand::CheckNow);
        }
    }

    /// Snapshot of the observable link state.
    pub fn status(&self) -> LinkStatus {
        let s = self.shared.borrow();
        LinkStatus {
            state: s.state,
            connected: s.connected,
            is_retrying: s.retry_session.is_some(),
            retry_message: s.retry_message.clone(),
            retry_attempts: s.retry_attempts_total,
            next_connection_time: s.next_connection_time,
            retrieved: s.retrieved.clone(),
        }
    }

    /// Current state machine position.
    pub fn state(&self) -> ConnectionState {
        self.shared.borrow().state
    }

    /// Derived next full-interval connection time, when scheduled.
    pub fn next_connection_time(&self) -> Option<Duration> {
        self.shared.borrow().next_connection_time
    }

    /// Snapshot of the activity counters.
    pub fn metrics(&self) -> LinkMetrics {
        self.shared.borrow().metrics.clone()
    }

    /// Take the event receiver. Returns `None` after the first call.
    pub fn take_events(&mut self) -> Option<EventReceiver> {
        self.events_rx.take()
    }

    /// Stop background tasks and wait for the schedule loop to exit.
    ///
    /// Touches neither the transport nor the persisted timestamp. The
    /// handle returns to idle, so a later connect can re-arm the cycle.
    pub async fn close(&mut self) {
        self.stop_tasks();
        if let Some(handle) = self.scheduler_handle.take() {
            let _ = handle.await;
        }
        let mut s = self.shared.borrow_mut();
        s.armed = false;
        s.connected = false;
        s.retry_session = None;
        s.retry_message = None;
        s.next_connection_time = None;
        s.state = ConnectionState::Idle;
    }

    /// Signal both background tasks to stop. Idempotent.
    fn stop_tasks(&mut self) {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(LinkCommand::Stop);
        }
        if let Some(tx) = self.monitor_shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
