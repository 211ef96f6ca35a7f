//! Configuration for link cadence and retry behavior.

use std::time::Duration;
use thiserror::Error;

/// Errors produced when validating a [`LinkConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The early-start offset must be strictly smaller than the interval.
    #[error("early start offset must be smaller than the connection interval")]
    EarlyStartTooLarge,

    /// Retry spacing must be non-zero.
    #[error("retry spacing must be non-zero")]
    ZeroRetrySpacing,

    /// The retry window must be non-zero.
    #[error("retry window must be non-zero")]
    ZeroRetryWindow,
}

/// Configuration for link scheduling and retry behavior.
///
/// The defaults encode the fixed connection policy: reconnect every six
/// minutes, start trying ten seconds early, and spend at most twenty
/// seconds per retry burst at 200 ms spacing.
#[derive(Clone, Debug)]
pub struct LinkConfig {
    /// Full interval between successful connections.
    pub connection_interval: Duration,

    /// How far before the full deadline a retry burst begins.
    pub early_start_offset: Duration,

    /// Hard wall-clock ceiling on a retry burst.
    pub retry_window: Duration,

    /// Spacing between attempts within a burst.
    pub retry_spacing: Duration,

    /// Maximum attempts per burst.
    pub max_attempts: u32,

    /// Period of the liveness poll while a link is managed.
    pub poll_interval: Duration,

    /// Timeout for the single manual connect attempt.
    pub connect_timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        let retry_window = Duration::from_secs(20);
        let retry_spacing = Duration::from_millis(200);
        Self {
            connection_interval: Duration::from_secs(6 * 60),
            early_start_offset: Duration::from_secs(10),
            retry_window,
            retry_spacing,
            // 20s / 200ms
            max_attempts: (retry_window.as_millis() / retry_spacing.as_millis()) as u32,
            poll_interval: Duration::from_secs(3),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl LinkConfig {
    /// Validate the configuration.
    ///
    /// Construction of a link fails fast on an invalid config rather than
    /// silently clamping values at schedule time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.early_start_offset >= self.connection_interval {
            return Err(ConfigError::EarlyStartTooLarge);
        }
        if self.retry_spacing.is_zero() {
            return Err(ConfigError::ZeroRetrySpacing);
        }
        if self.retry_window.is_zero() {
            return Err(ConfigError::ZeroRetryWindow);
        }
        Ok(())
    }
}
