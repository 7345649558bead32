//! Health monitor behaviour against live mock backends.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use traffic_balancer::config::TimeoutConfig;
use traffic_balancer::health::{HealthMonitor, ProbeSettings};
use traffic_balancer::http::client::build_client;
use traffic_balancer::lifecycle::Shutdown;
use traffic_balancer::load_balancer::backend::Backend;
use traffic_balancer::load_balancer::{Scheme, TrafficLedger, UNAVAILABLE};

mod common;

fn monitor(ledger: &Arc<TrafficLedger>, interval: Duration) -> Arc<HealthMonitor> {
    let client = build_client(&TimeoutConfig::default()).unwrap();
    Arc::new(HealthMonitor::new(
        ledger.clone(),
        client,
        ProbeSettings {
            scheme: Scheme::Http,
            path: "/health".into(),
            interval,
            timeout: Duration::from_secs(1),
        },
    ))
}

fn backend(addr: SocketAddr) -> Backend {
    Backend::parse(&addr.to_string()).unwrap()
}

#[tokio::test]
async fn test_failing_probe_sets_sentinel() {
    let addr = common::start_mock_backend("body", StatusCode::SERVICE_UNAVAILABLE).await;
    let ledger = Arc::new(TrafficLedger::new([addr.to_string()]));
    ledger.add(&addr.to_string(), 1234);

    let healthy = monitor(&ledger, Duration::from_secs(10)).check(&backend(addr)).await;

    assert!(!healthy);
    assert_eq!(ledger.score(&addr.to_string()), Some(UNAVAILABLE));
}

#[tokio::test]
async fn test_passing_probe_leaves_score_unchanged() {
    let addr = common::start_mock_backend("body", StatusCode::OK).await;
    let ledger = Arc::new(TrafficLedger::new([addr.to_string()]));
    ledger.add(&addr.to_string(), 42);

    let healthy = monitor(&ledger, Duration::from_secs(10)).check(&backend(addr)).await;

    assert!(healthy);
    assert_eq!(ledger.score(&addr.to_string()), Some(42));
}

#[tokio::test]
async fn test_passing_probe_does_not_clear_sentinel() {
    let addr = common::start_mock_backend("body", StatusCode::OK).await;
    let ledger = Arc::new(TrafficLedger::new([addr.to_string()]));
    ledger.mark_unavailable(&addr.to_string());

    assert!(monitor(&ledger, Duration::from_secs(10)).check(&backend(addr)).await);
    assert_eq!(ledger.score(&addr.to_string()), Some(UNAVAILABLE));
}

#[tokio::test]
async fn test_only_200_counts_as_healthy() {
    for status in [StatusCode::NO_CONTENT, StatusCode::MOVED_PERMANENTLY, StatusCode::NOT_FOUND] {
        let addr = common::start_mock_backend("body", status).await;
        let ledger = Arc::new(TrafficLedger::new([addr.to_string()]));

        let healthy = monitor(&ledger, Duration::from_secs(10)).check(&backend(addr)).await;

        assert!(!healthy, "status {} should be unhealthy", status);
        assert_eq!(ledger.score(&addr.to_string()), Some(UNAVAILABLE));
    }
}

#[tokio::test]
async fn test_unreachable_backend_is_unhealthy() {
    let addr = common::unused_addr().await;
    let ledger = Arc::new(TrafficLedger::new([addr.to_string()]));

    assert!(!monitor(&ledger, Duration::from_secs(10)).check(&backend(addr)).await);
    assert_eq!(ledger.score(&addr.to_string()), Some(UNAVAILABLE));
}

#[tokio::test]
async fn test_hanging_backend_times_out() {
    let router = Router::new().route(
        "/health",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "late"
        }),
    );
    let addr = common::start_backend(router).await;
    let ledger = Arc::new(TrafficLedger::new([addr.to_string()]));

    assert!(!monitor(&ledger, Duration::from_secs(10)).check(&backend(addr)).await);
    assert_eq!(ledger.score(&addr.to_string()), Some(UNAVAILABLE));
}

#[tokio::test]
async fn test_polling_waits_one_interval_and_stops_on_shutdown() {
    let hits = Arc::new(AtomicU32::new(0));
    let healthy = Arc::new(AtomicBool::new(true));
    let router = {
        let hits = hits.clone();
        let healthy = healthy.clone();
        Router::new().route(
            "/health",
            get(move || {
                let hits = hits.clone();
                let healthy = healthy.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    if healthy.load(Ordering::SeqCst) {
                        StatusCode::OK
                    } else {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                }
            }),
        )
    };
    let flaky = common::start_backend(router).await;
    let steady = common::start_mock_backend("body", StatusCode::OK).await;

    let ledger = Arc::new(TrafficLedger::new([flaky.to_string(), steady.to_string()]));
    ledger.add(&flaky.to_string(), 10);
    ledger.add(&steady.to_string(), 20);

    let shutdown = Shutdown::new();
    let supervisor = monitor(&ledger, Duration::from_millis(400))
        .spawn(&[backend(flaky), backend(steady)], &shutdown);
    assert_eq!(supervisor.len(), 2);
    assert_eq!(
        supervisor.addresses().collect::<Vec<_>>(),
        vec![flaky.to_string(), steady.to_string()]
    );

    // No probe at startup.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(hits.load(Ordering::SeqCst) >= 1);
    assert_eq!(ledger.score(&flaky.to_string()), Some(10));

    healthy.store(false, Ordering::SeqCst);
    common::wait_for_score(&ledger, &flaky.to_string(), UNAVAILABLE).await;
    assert_eq!(ledger.score(&steady.to_string()), Some(20));

    // Recovery does not rearm the entry.
    healthy.store(true, Ordering::SeqCst);
    let seen = hits.load(Ordering::SeqCst);
    while hits.load(Ordering::SeqCst) < seen + 2 {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(ledger.score(&flaky.to_string()), Some(UNAVAILABLE));

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(2), supervisor.join())
        .await
        .expect("health tasks did not stop");
}

#[tokio::test]
async fn test_unreachable_interval_idles_until_shutdown() {
    let addr = common::unused_addr().await;
    let ledger = Arc::new(TrafficLedger::new([addr.to_string()]));

    let shutdown = Shutdown::new();
    let supervisor = monitor(&ledger, Duration::MAX).spawn(&[backend(addr)], &shutdown);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(ledger.score(&addr.to_string()), Some(0));

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(2), supervisor.join())
        .await
        .expect("health task did not stop");
}
