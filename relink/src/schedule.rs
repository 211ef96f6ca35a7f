//! Pure schedule arithmetic.
//!
//! Everything here is a function of `(last successful connection, now)` and
//! the configured cadence; no clocks, no side effects. The scheduler and
//! reconciler recompute these on every decision instead of caching derived
//! deadlines across timestamp updates.

use std::time::Duration;

/// Deadline of the next full-interval connection.
///
/// With no recorded connection the peripheral has never been reached, so
/// the nominal deadline is one interval from now.
pub fn next_full_deadline(last: Option<Duration>, now: Duration, interval: Duration) -> Duration {
    match last {
        Some(last) => last + interval,
        None => now + interval,
    }
}

/// Deadline at which retry attempts should begin.
///
/// Attempts start `early_start` before the full deadline. With no recorded
/// connection, attempts should begin immediately.
pub fn early_start_deadline(
    last: Option<Duration>,
    now: Duration,
    interval: Duration,
    early_start: Duration,
) -> Duration {
    debug_assert!(early_start < interval, "config validated at construction");
    match last {
        Some(last) => last + interval - early_start,
        None => now,
    }
}

/// Remaining time until retry attempts should begin. Saturates at zero.
pub fn time_until_early_start(
    last: Option<Duration>,
    now: Duration,
    interval: Duration,
    early_start: Duration,
) -> Duration {
    early_start_deadline(last, now, interval, early_start).saturating_sub(now)
}

/// Whether enough time has passed that a connection should be attempted
/// right now.
///
/// Used by the lifecycle reconciler after a process resume, where elapsed
/// wall-clock time is the only trustworthy signal.
pub fn should_connect_now(
    last: Option<Duration>,
    now: Duration,
    interval: Duration,
    early_start: Duration,
) -> bool {
    match last {
        Some(last) => now.saturating_sub(last) >= interval - early_start,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_secs(6 * 60);
    const EARLY: Duration = Duration::from_secs(10);

    #[test]
    fn test_first_connection_is_immediate() {
        let now = Duration::from_secs(1000);
        assert_eq!(early_start_deadline(None, now, INTERVAL, EARLY), now);
        assert_eq!(
            next_full_deadline(None, now, INTERVAL),
            now + INTERVAL
        );
        assert!(should_connect_now(None, now, INTERVAL, EARLY));
        assert_eq!(
            time_until_early_start(None, now, INTERVAL, EARLY),
            Duration::ZERO
        );
    }

    #[test]
    fn test_deadlines_derive_from_last_connection() {
        let last = Duration::from_secs(1000);
        let now = Duration::from_secs(1005);
        assert_eq!(
            next_full_deadline(Some(last), now, INTERVAL),
            Duration::from_secs(1360)
        );
        assert_eq!(
            early_start_deadline(Some(last), now, INTERVAL, EARLY),
            Duration::from_secs(1350)
        );
        // 5m50s minus the 5s already elapsed
        assert_eq!(
            time_until_early_start(Some(last), now, INTERVAL, EARLY),
            Duration::from_secs(345)
        );
    }

    #[test]
    fn test_early_start_never_exceeds_full_deadline() {
        for last_s in [0u64, 1, 60, 359, 360, 10_000] {
            let last = Duration::from_secs(last_s);
            let now = last + Duration::from_secs(1);
            assert!(
                early_start_deadline(Some(last), now, INTERVAL, EARLY)
                    <= next_full_deadline(Some(last), now, INTERVAL)
            );
        }
    }

    #[test]
    fn test_deadlines_monotonic_in_last_timestamp() {
        let now = Duration::from_secs(100_000);
        let mut prev_full = Duration::ZERO;
        let mut prev_early = Duration::ZERO;
        for last_s in [0u64, 10, 500, 99_000, 100_000] {
            let last = Duration::from_secs(last_s);
            let full = next_full_deadline(Some(last), now, INTERVAL);
            let early = early_start_deadline(Some(last), now, INTERVAL, EARLY);
            assert!(full >= prev_full);
            assert!(early >= prev_early);
            prev_full = full;
            prev_early = early;
        }
    }

    #[test]
    fn test_should_connect_exactly_at_early_boundary() {
        let last = Duration::from_secs(1000);
        // interval - offset = 5m50s
        let boundary = last + Duration::from_secs(350);
        assert!(!should_connect_now(
            Some(last),
            boundary - Duration::from_secs(1),
            INTERVAL,
            EARLY
        ));
        assert!(should_connect_now(Some(last), boundary, INTERVAL, EARLY));
    }

    #[test]
    fn test_should_connect_when_overdue() {
        let last = Duration::from_secs(1000);
        let now = last + INTERVAL + Duration::from_secs(1);
        assert!(should_connect_now(Some(last), now, INTERVAL, EARLY));
        assert_eq!(
            time_until_early_start(Some(last), now, INTERVAL, EARLY),
            Duration::ZERO
        );
    }
}
