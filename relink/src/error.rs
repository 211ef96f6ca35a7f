//! Error types for link operations.

use relink_core::{AddressParseError, StoreError, TransportError};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced to callers of the link API.
///
/// Only user-facing failures appear here. Transport and persistence
/// failures inside the retry/reschedule cycle are absorbed by the engine
/// and never terminate it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The entered hardware address is malformed. Rejected before any
    /// timer or transport call is made.
    #[error("invalid hardware address: {0}")]
    InvalidAddress(#[from] AddressParseError),

    /// The platform permission layer denied transport access.
    #[error("transport authorization denied")]
    PermissionDenied,

    /// The manual connect attempt failed.
    #[error("connect failed: {0}")]
    ConnectFailed(TransportError),

    /// The disconnect request failed.
    #[error("disconnect failed: {0}")]
    DisconnectFailed(TransportError),

    /// The persisted timestamp could not be accessed.
    #[error("persistence error: {0}")]
    Store(#[from] StoreError),

    /// The link configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// A link is already being managed; disconnect first.
    #[error("a link is already being managed")]
    AlreadyArmed,

    /// No link is currently being managed.
    #[error("no link is being managed")]
    NotConnected,
}

/// Result type for link operations.
pub type LinkResult<T> = Result<T, LinkError>;
