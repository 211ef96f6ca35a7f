//! Schedule re-evaluation: resume-style checks against the persisted
//! timestamp.

mod support;

use std::time::Duration;

use relink::{Link, LinkConfig, LinkEvent};
use relink_core::TimestampStore;
use support::{drain_events, run_local, TestProviders, ADDRESS};

#[test]
fn test_check_now_before_connect_is_noop() {
    run_local(async {
        let providers = TestProviders::new();
        let mut link = Link::new(providers.clone(), LinkConfig::default()).expect("valid config");
        let mut events = link.take_events().expect("first take");

        link.check_now();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(drain_events(&mut events).is_empty());
        assert!(providers.transport.attempt_times().is_empty());
    });
}

#[test]
fn test_newer_timestamp_postpones_the_burst() {
    run_local(async {
        let providers = TestProviders::new();
        let mut link = Link::new(providers.clone(), LinkConfig::default()).expect("valid config");
        let mut events = link.take_events().expect("first take");

        link.connect(ADDRESS).await.expect("manual connect");
        drain_events(&mut events);

        // Another writer recorded a fresher connection at t=100s. A
        // re-evaluation must pick it up and move the deadline out. The
        // initial arming event lands during the sleep; drop it so the
        // assertion sees only the re-derived deadline.
        tokio::time::sleep(Duration::from_secs(100)).await;
        drain_events(&mut events);
        providers
            .store
            .set_last_connection(Duration::from_secs(100))
            .await
            .expect("seed store");
        link.check_now();

        let deadline = loop {
            if let LinkEvent::Scheduled { deadline } =
                events.recv().await.expect("event stream open")
            {
                break deadline;
            }
        };
        assert_eq!(deadline, Duration::from_secs(460));

        loop {
            if let LinkEvent::RetryAttempt { .. } = events.recv().await.expect("event stream open")
            {
                break;
            }
        }
        assert_eq!(
            providers.transport.attempt_times()[1],
            Duration::from_secs(450)
        );

        link.close().await;
    });
}

#[test]
fn test_overdue_timestamp_fires_immediately() {
    run_local(async {
        let providers = TestProviders::new();
        let config = LinkConfig {
            connection_interval: Duration::from_secs(60),
            early_start_offset: Duration::from_secs(10),
            ..LinkConfig::default()
        };
        let mut link = Link::new(providers.clone(), config).expect("valid config");
        let mut events = link.take_events().expect("first take");

        link.connect(ADDRESS).await.expect("manual connect");

        // Let one cycle complete at t=50s, then wait for the re-arm.
        let mut scheduled_seen = 0;
        while scheduled_seen < 2 {
            if let LinkEvent::Scheduled { .. } = events.recv().await.expect("event stream open") {
                scheduled_seen += 1;
            }
        }
        assert_eq!(
            providers.transport.attempt_times(),
            vec![Duration::ZERO, Duration::from_secs(50)]
        );

        // Roll the timestamp back to something long overdue, as after a
        // process suspension where wall-clock time ran past the deadline.
        providers
            .store
            .set_last_connection(Duration::ZERO)
            .await
            .expect("seed store");
        link.check_now();

        loop {
            if let LinkEvent::RetryAttempt { .. } = events.recv().await.expect("event stream open")
            {
                break;
            }
        }
        // The burst fired at once rather than waiting for the armed timer.
        assert_eq!(
            providers.transport.attempt_times()[2],
            Duration::from_secs(50)
        );

        link.close().await;
    });
}

#[test]
fn test_check_now_during_burst_keeps_single_session() {
    run_local(async {
        let providers = TestProviders::new();
        let config = LinkConfig {
            connection_interval: Duration::from_secs(60),
            early_start_offset: Duration::from_secs(10),
            retry_window: Duration::from_secs(5),
            ..LinkConfig::default()
        };
        let mut link = Link::new(providers.clone(), config).expect("valid config");
        let mut events = link.take_events().expect("first take");

        link.connect(ADDRESS).await.expect("manual connect");
        drain_events(&mut events);
        providers.transport.set_always_fail(true);

        let mut attempts_seen = Vec::new();
        let exhausted = loop {
            match events.recv().await.expect("event stream open") {
                LinkEvent::RetryAttempt { attempt } => {
                    attempts_seen.push(attempt);
                    // A resume check mid-burst must not restart the
                    // session or reset the attempt counter.
                    if attempt == 2 {
                        link.check_now();
                    }
                }
                LinkEvent::BurstExhausted { attempts } => break attempts,
                _ => {}
            }
        };

        // Five seconds at 200ms spacing: the numbering runs straight
        // through without restarting.
        assert_eq!(exhausted, 25);
        assert_eq!(attempts_seen, (1..=25).collect::<Vec<_>>());

        link.close().await;
    });
}
