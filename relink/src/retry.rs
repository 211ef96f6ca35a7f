//! Bounded retry bursts against the transport.
//!
//! A burst is one bounded-duration, bounded-count sequence of connection
//! attempts with fixed spacing. The wall-clock window is the authoritative
//! ceiling: slow attempts are clipped at the window edge rather than being
//! allowed to extend the burst.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use relink_core::{Providers, TimeError, TimeProvider, TimestampStore, Transport};
use tokio::sync::mpsc;

use crate::events::LinkEvent;
use crate::link::LinkShared;
use crate::scheduler::LinkCommand;
use crate::state::ConnectionState;

/// Transient state of one retry burst.
///
/// Exists only while a burst is running; its presence in the shared state
/// is the mutual-exclusion guard ensuring at most one burst per link.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RetrySession {
    /// When the burst began.
    pub(crate) started_at: Duration,
    /// Wall-clock ceiling: `started_at + retry_window`.
    pub(crate) deadline: Duration,
    /// Attempts made so far in this burst.
    pub(crate) attempt_count: u32,
}

/// Outcome of a retry burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BurstOutcome {
    /// An attempt connected; the timestamp was persisted.
    Succeeded,
    /// The window or attempt budget ran out without connecting.
    Exhausted,
    /// A session already existed; this trigger was a no-op.
    AlreadyRunning,
    /// The burst was interrupted by the given command.
    Cancelled(LinkCommand),
}

/// Run one retry burst to completion.
///
/// Never fatal: exhaustion is reported to the caller, which reschedules
/// for the next interval. Commands arriving mid-burst cancel it
/// (`ConnectionLost`, `Stop`) or are ignored as duplicate triggers
/// (`CheckNow`).
pub(crate) async fn run_retry_burst<P: Providers>(
    shared: &Rc<RefCell<LinkShared<P>>>,
    cmd_rx: &mut mpsc::UnboundedReceiver<LinkCommand>,
) -> BurstOutcome {
    let (time, transport, store, address, config) = {
        let s = shared.borrow();
        let address = match s.address {
            Some(address) => address,
            None => return BurstOutcome::Cancelled(LinkCommand::Stop),
        };
        (
            s.time.clone(),
            s.transport.clone(),
            s.store.clone(),
            address,
            s.config.clone(),
        )
    };

    // Guard: at most one session per link, ever.
    let deadline = {
        let mut s = shared.borrow_mut();
        if s.retry_session.is_some() {
            tracing::warn!("retry burst already in progress, ignoring duplicate trigger");
            return BurstOutcome::AlreadyRunning;
        }
        let started_at = time.now();
        let session = RetrySession {
            started_at,
            deadline: started_at + config.retry_window,
            attempt_count: 0,
        };
        let deadline = session.deadline;
        tracing::debug!(
            "retry burst started at {:?}, window closes at {:?}",
            session.started_at,
            deadline
        );
        s.retry_session = Some(session);
        s.state = ConnectionState::Retrying;
        s.metrics.record_burst_started();
        deadline
    };

    let mut attempts = 0u32;
    loop {
        // Wall-clock ceiling: no attempt may start past the deadline.
        if time.now() >= deadline {
            return exhaust(shared, time.now());
        }

        attempts += 1;
        {
            let mut s = shared.borrow_mut();
            if let Some(session) = s.retry_session.as_mut() {
                session.attempt_count = attempts;
            }
            s.retry_attempts_total += 1;
            s.retry_message = Some(format!("Reconnecting, attempt {}", attempts));
            s.metrics.record_connection_attempt();
            s.emit(LinkEvent::RetryAttempt { attempt: attempts });
        }
        tracing::debug!("retry attempt {}/{}", attempts, config.max_attempts);

        // Cap the attempt at the window edge so a slow connect cannot
        // push the burst past its deadline.
        let remaining = deadline.saturating_sub(time.now());
        let result: Result<_, TimeError> =
            time.timeout(remaining, transport.connect(&address)).await;

        match result {
            Ok(Ok(())) => {
                let now = time.now();
                // Persistence failure degrades to "first connection" on
                // the next read; it never unwinds an established link.
                if let Err(e) = store.set_last_connection(now).await {
                    tracing::warn!("failed to persist connection time: {}", e);
                }
                let retrieved = transport.retrieve(&address).await;
                {
                    let mut s = shared.borrow_mut();
                    s.retry_session = None;
                    s.retry_message = None;
                    s.connected = true;
                    s.metrics.record_connection_success();
                    s.metrics.record_burst_succeeded();
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
                tracing::debug!("retry burst succeeded on attempt {}", attempts);
                return BurstOutcome::Succeeded;
            }
            Ok(Err(e)) => {
                tracing::debug!("retry attempt {} failed: {}", attempts, e);
                shared.borrow_mut().metrics.record_connection_failure();
            }
            Err(_) => {
                tracing::debug!("retry attempt {} clipped at window edge", attempts);
                shared.borrow_mut().metrics.record_connection_failure();
            }
        }

        if attempts >= config.max_attempts {
            return exhaust(shared, time.now());
        }

        // Spacing delay, interruptible by commands. A CheckNow here is a
        // duplicate trigger while the session exists: a no-op.
        let resume_at = time.now() + config.retry_spacing;
        loop {
            let now = time.now();
            if now >= resume_at {
                break;
            }
            tokio::select! {
                _ = time.sleep(resume_at - now) => {}
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(LinkCommand::CheckNow) => {
                            tracing::debug!("reconcile during active burst ignored");
                        }
                        Some(cmd) => return cancel(shared, cmd),
                        None => return cancel(shared, LinkCommand::Stop),
                    }
                }
            }
        }
    }
}

/// End a burst without success and report exhaustion.
fn exhaust<P: Providers>(shared: &Rc<RefCell<LinkShared<P>>>, now: Duration) -> BurstOutcome {
    let mut s = shared.borrow_mut();
    let (attempts, elapsed) = match s.retry_session.take() {
        Some(session) => (
            session.attempt_count,
            now.saturating_sub(session.started_at),
        ),
        None => (0, Duration::ZERO),
    };
    s.retry_message = None;
    s.metrics.record_burst_exhausted();
    s.emit(LinkEvent::BurstExhausted { attempts });
    tracing::debug!(
        "retry burst exhausted after {} attempts in {:?}",
        attempts,
        elapsed
    );
    BurstOutcome::Exhausted
}

/// Tear down a burst interrupted by a command.
fn cancel<P: Providers>(shared: &Rc<RefCell<LinkShared<P>>>, cmd: LinkCommand) -> BurstOutcome {
    let mut s = shared.borrow_mut();
    s.retry_session = None;
    s.retry_message = None;
    tracing::debug!("retry burst cancelled by {:?}", cmd);
    BurstOutcome::Cancelled(cmd)
}
