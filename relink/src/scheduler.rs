//! The schedule loop: arm a timer toward the next early-start deadline,
//! run a retry burst when it fires, re-arm from the persisted timestamp.
//!
//! Deadlines are absolute and recomputed from the persisted timestamp on
//! every cycle, never accumulated from relative sleeps. A burst that
//! exhausts leaves the timestamp untouched, so the next recomputation sees
//! an overdue deadline and starts the next burst immediately.

use std::cell::RefCell;
use std::rc::Rc;

use relink_core::{Providers, TimeProvider, TimestampStore};
use tokio::sync::mpsc;

use crate::events::LinkEvent;
use crate::link::LinkShared;
use crate::retry::{self, BurstOutcome};
use crate::schedule;
use crate::state::ConnectionState;

/// Commands accepted by the schedule loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LinkCommand {
    /// Re-evaluate the schedule now, typically after a process resume.
    /// Deadlines are absolute, so this either re-arms for the identical
    /// fire time or fires immediately when overdue.
    CheckNow,
    /// The liveness monitor detected loss; stop everything.
    ConnectionLost,
    /// User-requested shutdown of the cycle.
    Stop,
}

/// Drive the retry cycle until stopped.
///
/// Runs as a background task spawned at arm time. Exactly one instance
/// exists per armed link; it owns the sole timer.
pub(crate) async fn schedule_loop<P: Providers>(
    shared: Rc<RefCell<LinkShared<P>>>,
    mut cmd_rx: mpsc::UnboundedReceiver<LinkCommand>,
) {
    let (time, store, config) = {
        let s = shared.borrow();
        (s.time.clone(), s.store.clone(), s.config.clone())
    };

    loop {
        if !shared.borrow().armed {
            break;
        }

        // The persisted timestamp is re-read on every arming decision so
        // external updates are picked up. A read failure degrades to the
        // first-connection schedule: connect immediately.
        let last = match store.get_last_connection().await {
            Ok(last) => last,
            Err(e) => {
                tracing::warn!("timestamp read failed, connecting immediately: {}", e);
                None
            }
        };

        let now = time.now();
        let next = schedule::next_full_deadline(last, now, config.connection_interval);
        let delay = schedule::time_until_early_start(
            last,
            now,
            config.connection_interval,
            config.early_start_offset,
        );
        {
            let mut s = shared.borrow_mut();
            s.state = ConnectionState::Scheduled;
            s.next_connection_time = Some(next);
            s.emit(LinkEvent::Scheduled { deadline: next });
        }
        tracing::debug!(
            "next connection at {:?}, retry burst in {:?}",
            next,
            delay
        );

        if !delay.is_zero() {
            tokio::select! {
                _ = time.sleep(delay) => {}
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(LinkCommand::CheckNow) => {
                            tracing::debug!("schedule re-evaluation requested");
                            continue;
                        }
                        Some(LinkCommand::ConnectionLost) => {
                            mark_lost(&shared);
                            break;
                        }
                        Some(LinkCommand::Stop) | None => break,
                    }
                }
            }
        }

        match retry::run_retry_burst(&shared, &mut cmd_rx).await {
            // Re-arm regardless of outcome. The cadence is time-based,
            // not success-based, and an exhausted burst leaves a stale
            // timestamp behind that makes the next cycle fire at once.
            BurstOutcome::Succeeded | BurstOutcome::Exhausted | BurstOutcome::AlreadyRunning => {}
            BurstOutcome::Cancelled(LinkCommand::ConnectionLost) => {
                mark_lost(&shared);
                break;
            }
            BurstOutcome::Cancelled(_) => break,
        }
    }
    tracing::debug!("schedule loop stopped");
}

/// Tear down after monitor-detected loss. No timer survives this; the
/// engine stays dormant until the next manual connect.
fn mark_lost<P: Providers>(shared: &Rc<RefCell<LinkShared<P>>>) {
    let mut s = shared.borrow_mut();
    s.state = ConnectionState::Disconnected;
    s.connected = false;
    s.armed = false;
    s.retry_session = None;
    s.retry_message = None;
    s.next_connection_time = None;
    s.emit(LinkEvent::ConnectionLost);
    tracing::warn!("connection lost, automatic reconnection disabled");
}
