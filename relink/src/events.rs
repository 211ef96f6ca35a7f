//! Typed event stream for link observers.
//!
//! Internal dispatch is a typed channel with an explicit subscriber, not
//! name-based re-emission: components push [`LinkEvent`] values and the
//! host drains them from the receiver obtained via `Link::take_events`.

use relink_core::HardwareAddress;
use std::time::Duration;
use tokio::sync::mpsc;

/// Events emitted by the link engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A connection (manual or retry) succeeded.
    Connected {
        /// Address of the connected peripheral.
        address: HardwareAddress,
    },

    /// A user-requested disconnect completed.
    Disconnected,

    /// The liveness monitor detected connection loss.
    ConnectionLost,

    /// A schedule timer was armed for the next cycle.
    Scheduled {
        /// Derived full-interval deadline being scheduled toward.
        deadline: Duration,
    },

    /// A retry attempt is being made.
    RetryAttempt {
        /// Attempt number within the current burst, starting at 1.
        attempt: u32,
    },

    /// A retry burst ran out of time or attempts without connecting.
    BurstExhausted {
        /// Attempts made before giving up.
        attempts: u32,
    },

    /// An opaque data item was retrieved from the peripheral.
    DataRetrieved {
        /// The retrieved item, uninterpreted.
        item: String,
    },
}

/// Receiving half of the link event stream.
///
/// Obtained once via `Link::take_events`.
pub type EventReceiver = mpsc::UnboundedReceiver<LinkEvent>;
