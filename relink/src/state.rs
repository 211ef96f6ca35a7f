//! Connection state machine and observable status snapshot.

use std::time::Duration;

/// State of the managed link.
///
/// Exactly one state exists per link, mutated only by the orchestration
/// layer in response to transport results, timer fires, or user actions.
///
/// ```text
/// Idle ──connect──► Connecting ──ok──► Scheduled ◄──────────────┐
///                        │                 │                    │
///                        └─err─► Idle      │ timer fires        │ success or
///                                          ▼                    │ exhaustion
///                                      Retrying ────────────────┘
///
/// Scheduled/Retrying ──user disconnect──► Disconnecting ──► Idle
/// Scheduled/Retrying ──liveness loss────► Disconnected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No link is being managed.
    Idle,
    /// A manual connect attempt is in progress.
    Connecting,
    /// The peripheral is connected and no timer has been armed yet.
    Connected,
    /// A schedule timer is armed for the next retry burst.
    Scheduled,
    /// A retry burst is in progress.
    Retrying,
    /// A user-requested disconnect is in progress.
    Disconnecting,
    /// The liveness monitor detected loss; no automatic retry will happen
    /// until a new manual connect.
    Disconnected,
}

/// Point-in-time snapshot of the observable link state.
///
/// This is the presentation boundary: everything a UI needs to render the
/// link without reaching into the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkStatus {
    /// Current state machine position.
    pub state: ConnectionState,
    /// Whether the peripheral link is believed alive.
    pub connected: bool,
    /// Whether a retry burst is currently running.
    pub is_retrying: bool,
    /// Human-readable retry progress, present only during a burst.
    pub retry_message: Option<String>,
    /// Total retry attempts made over the life of this link. Monotonic.
    pub retry_attempts: u64,
    /// Derived next full-interval connection time, when scheduled.
    pub next_connection_time: Option<Duration>,
    /// Opaque items retrieved from the peripheral after each connection.
    pub retrieved: Vec<String>,
}
