//! Persistence of the last successful connection timestamp.
//!
//! The whole schedule derives from one durable value: when the peripheral
//! was last successfully connected. Semantics are deliberately minimal:
//! last-write-wins, no versioning, absence means "never connected".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a timestamp store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Reading the stored value failed.
    #[error("store read failed: {0}")]
    Read(String),

    /// Writing the value failed.
    #[error("store write failed: {0}")]
    Write(String),

    /// The stored record exists but could not be decoded.
    #[error("stored record malformed: {0}")]
    Malformed(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Provider trait for persisting the last successful connection time.
///
/// Timestamps are offsets from the time provider's epoch (see
/// `TimeProvider`); store and clock must share an epoch for persisted
/// values to stay meaningful.
#[async_trait(?Send)]
pub trait TimestampStore: Clone {
    /// Record the given time as the last successful connection.
    async fn set_last_connection(&self, timestamp: Duration) -> StoreResult<()>;

    /// Read back the last successful connection time.
    ///
    /// `Ok(None)` means no connection has ever been recorded.
    async fn get_last_connection(&self) -> StoreResult<Option<Duration>>;
}

/// In-memory store, shared across clones.
///
/// Used by tests and by hosts that do not need the schedule to survive a
/// process restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryTimestampStore {
    inner: Rc<RefCell<Option<Duration>>>,
}

impl MemoryTimestampStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a timestamp.
    pub fn with_timestamp(timestamp: Duration) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Some(timestamp))),
        }
    }
}

#[async_trait(?Send)]
impl TimestampStore for MemoryTimestampStore {
    async fn set_last_connection(&self, timestamp: Duration) -> StoreResult<()> {
        *self.inner.borrow_mut() = Some(timestamp);
        Ok(())
    }

    async fn get_last_connection(&self) -> StoreResult<Option<Duration>> {
        Ok(*self.inner.borrow())
    }
}

/// Durable record format for [`JsonFileStore`].
#[derive(Debug, Serialize, Deserialize)]
struct StoredTimestamp {
    /// Milliseconds since the time provider's epoch.
    last_connection_ms: u64,
}

/// File-backed store holding a single JSON record.
///
/// Plain overwrite is sufficient here: writes are serialized by the
/// engine's no-overlapping-bursts invariant, and the contract is
/// last-write-wins.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: Rc<PathBuf>,
}

impl JsonFileStore {
    /// Create a store persisting to the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Rc::new(path.into()),
        }
    }
}

#[async_trait(?Send)]
impl TimestampStore for JsonFileStore {
    async fn set_last_connection(&self, timestamp: Duration) -> StoreResult<()> {
        let record = StoredTimestamp {
            last_connection_ms: timestamp.as_millis().min(u64::MAX as u128) as u64,
        };
        let bytes =
            serde_json::to_vec(&record).map_err(|e| StoreError::Write(e.to_string()))?;
        tokio::fs::write(self.path.as_ref(), bytes)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))
    }

    async fn get_last_connection(&self) -> StoreResult<Option<Duration>> {
        let bytes = match tokio::fs::read(self.path.as_ref()).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Read(e.to_string())),
        };
        let record: StoredTimestamp =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Malformed(e.to_string()))?;
        Ok(Some(Duration::from_millis(record.last_connection_ms)))
    }
}
