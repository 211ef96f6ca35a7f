//! Time provider abstraction.
//!
//! All scheduling arithmetic in relink works on [`Duration`] offsets from a
//! provider-defined epoch. Swapping the provider swaps the epoch and the
//! sleep mechanism, which is how tests run multi-minute schedules
//! deterministically under tokio's paused clock.

use async_trait::async_trait;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors that can occur during time operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// The operation timed out.
    #[error("operation timed out")]
    Elapsed,

    /// The time provider has been shut down and is no longer accessible.
    #[error("time provider shut down")]
    Shutdown,
}

/// Provider trait for time operations.
///
/// ## Epoch semantics
///
/// `now()` returns a duration since the provider's epoch. The epoch is
/// provider-defined: [`TokioTimeProvider`] counts from provider creation
/// (monotonic, test-clock aware), [`SystemTimeProvider`] counts from
/// `UNIX_EPOCH` (stable across process restarts). Persisted timestamps are
/// only meaningful when read back under a provider with the same epoch, so
/// durable deployments should pair a durable store with
/// [`SystemTimeProvider`].
#[async_trait(?Send)]
pub trait TimeProvider: Clone {
    /// Sleep for the specified duration.
    async fn sleep(&self, duration: Duration) -> Result<(), TimeError>;

    /// Get the current time as an offset from the provider's epoch.
    fn now(&self) -> Duration;

    /// Run a future with a timeout.
    ///
    /// Returns `Ok(result)` if the future completes within the timeout,
    /// or `Err(TimeError::Elapsed)` if it times out.
    async fn timeout<F, T>(&self, duration: Duration, future: F) -> Result<T, TimeError>
    where
        F: std::future::Future<Output = T>;
}

/// Monotonic time provider using tokio's time facilities.
///
/// `now()` is elapsed time since provider creation, measured with
/// [`tokio::time::Instant`] so it follows the paused test clock under
/// `start_paused` runtimes. Not suitable for timestamps that must survive
/// a restart.
#[derive(Debug, Clone)]
pub struct TokioTimeProvider {
    /// Start instant for calculating elapsed duration
    start_time: tokio::time::Instant,
}

impl TokioTimeProvider {
    /// Create a new tokio time provider with its epoch at "now".
    pub fn new() -> Self {
        Self {
            start_time: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl TimeProvider for TokioTimeProvider {
    async fn sleep(&self, duration: Duration) -> Result<(), TimeError> {
        tokio::time::sleep(duration).await;
        Ok(())
    }

    fn now(&self) -> Duration {
        self.start_time.elapsed()
    }

    async fn timeout<F, T>(&self, duration: Duration, future: F) -> Result<T, TimeError>
    where
        F: std::future::Future<Output = T>,
    {
        match tokio::time::timeout(duration, future).await {
            Ok(result) => Ok(result),
            Err(_) => Err(TimeError::Elapsed),
        }
    }
}

/// Wall-clock time provider with a `UNIX_EPOCH` epoch.
///
/// `now()` survives process restarts, which makes it the right pairing for
/// a durable timestamp store: a schedule computed before a restart still
/// lands on the same wall-clock deadline afterwards.
#[derive(Debug, Clone)]
pub struct SystemTimeProvider;

impl SystemTimeProvider {
    /// Create a new system time provider.
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl TimeProvider for SystemTimeProvider {
    async fn sleep(&self, duration: Duration) -> Result<(), TimeError> {
        tokio::time::sleep(duration).await;
        Ok(())
    }

    fn now(&self) -> Duration {
        // A clock before 1970 is a host misconfiguration; treat as epoch.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
    }

    async fn timeout<F, T>(&self, duration: Duration, future: F) -> Result<T, TimeError>
    where
        F: std::future::Future<Output = T>,
    {
        match tokio::time::timeout(duration, future).await {
            Ok(result) => Ok(result),
            Err(_) => Err(TimeError::Elapsed),
        }
    }
}
