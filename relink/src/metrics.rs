//! Counters for link activity.
//!
//! Cheap to clone; `Link::metrics` hands out snapshots for diagnostics and
//! tests. Counters only ever increase.

/// Counters describing link activity since construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMetrics {
    /// Individual connection attempts, manual and retry.
    pub connection_attempts: u64,
    /// Attempts that resulted in an established link.
    pub connection_successes: u64,
    /// Attempts that failed or timed out.
    pub connection_failures: u64,
    /// Retry bursts started.
    pub bursts_started: u64,
    /// Retry bursts that ended in a successful connection.
    pub bursts_succeeded: u64,
    /// Retry bursts that ran out of time or attempts.
    pub bursts_exhausted: u64,
    /// Liveness polls performed.
    pub polls: u64,
    /// Connection losses detected by the liveness monitor.
    pub losses_detected: u64,
}

impl LinkMetrics {
    /// Create zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_connection_attempt(&mut self) {
        self.connection_attempts += 1;
    }

    pub(crate) fn record_connection_success(&mut self) {
        self.connection_successes += 1;
    }

    pub(crate) fn record_connection_failure(&mut self) {
        self.connection_failures += 1;
    }

    pub(crate) fn record_burst_started(&mut self) {
        self.bursts_started += 1;
    }

    pub(crate) fn record_burst_succeeded(&mut self) {
        self.bursts_succeeded += 1;
    }

    pub(crate) fn record_burst_exhausted(&mut self) {
        self.bursts_exhausted += 1;
    }

    pub(crate) fn record_poll(&mut self) {
        self.polls += 1;
    }

    pub(crate) fn record_loss(&mut self) {
        self.losses_detected += 1;
    }
}
