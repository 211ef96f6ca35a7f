//! Transport abstraction over the physical peripheral link.
//!
//! The engine never touches radio or socket APIs directly. Everything it
//! needs from the physical layer is expressed here: connect, disconnect, a
//! liveness query, an authorization hook, and an opaque post-connect data
//! retrieval. Hosts implement this against their real stack; tests script
//! it.

use async_trait::async_trait;
use thiserror::Error;

use crate::HardwareAddress;

/// Errors reported by the physical transport.
///
/// Every variant is recoverable: the retry and reschedule cycle absorbs
/// transport failures and never terminates on one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// A connection attempt failed.
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    /// A disconnect request failed.
    #[error("disconnect failed: {0}")]
    DisconnectFailed(String),

    /// The transport is not ready for use (e.g. radio powered off).
    #[error("transport not ready: {0}")]
    NotReady(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Provider trait for the physical peripheral transport.
///
/// All operations are asynchronous and address-keyed. Implementations may
/// treat `connect` on an already-connected peripheral as a cheap success.
#[async_trait(?Send)]
pub trait Transport: Clone {
    /// Ask the platform permission layer for authorization to use the
    /// transport. Returns `Ok(false)` when the user denied access.
    async fn request_authorization(&self) -> TransportResult<bool>;

    /// Attempt to connect to the peripheral.
    async fn connect(&self, address: &HardwareAddress) -> TransportResult<()>;

    /// Disconnect from the peripheral.
    async fn disconnect(&self, address: &HardwareAddress) -> TransportResult<()>;

    /// Query whether the link to the peripheral is currently alive.
    async fn is_connected(&self, address: &HardwareAddress) -> bool;

    /// Fetch one opaque data item from the connected peripheral.
    ///
    /// The engine does not interpret the payload; it only appends whatever
    /// comes back to an observable list. `Ok(None)` means the peripheral
    /// had nothing to report.
    async fn retrieve(&self, address: &HardwareAddress) -> TransportResult<Option<String>>;
}
