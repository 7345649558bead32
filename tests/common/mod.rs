//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use traffic_balancer::config::BalancerConfig;
use traffic_balancer::http::HttpServer;
use traffic_balancer::lifecycle::Shutdown;
use traffic_balancer::load_balancer::TrafficLedger;

/// Serve `router` on an ephemeral local port.
pub async fn start_backend(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// A backend answering every path with `body` and `/health` with `health`.
pub async fn start_mock_backend(body: &'static str, health: StatusCode) -> SocketAddr {
    let router = Router::new()
        .route("/health", get(move || async move { (health, "health") }))
        .fallback(move || async move { body });
    start_backend(router).await
}

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Configuration pointing at `backends`, with probes slow enough to stay out
/// of the way.
pub fn test_config(backends: &[SocketAddr]) -> BalancerConfig {
    let mut config = BalancerConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config.backends.addresses = backends.iter().map(|a| a.to_string()).collect();
    config.health_check.interval_secs = 3600;
    config
}

pub struct RunningBalancer {
    pub addr: SocketAddr,
    pub ledger: Arc<TrafficLedger>,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<()>,
}

impl RunningBalancer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server to return.
    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop")
            .unwrap();
    }
}

/// Start the balancer on an ephemeral port.
pub async fn spawn_balancer(config: BalancerConfig) -> RunningBalancer {
    let server = HttpServer::new(config).unwrap();
    let ledger = server.ledger();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    let handle = tokio::spawn(async move {
        server.run(listener, server_shutdown).await.unwrap();
    });

    RunningBalancer {
        addr,
        ledger,
        shutdown,
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Poll until `address` holds `expected`; response accounting completes
/// shortly after the client has read the body.
pub async fn wait_for_score(ledger: &TrafficLedger, address: &str, expected: i64) {
    for _ in 0..100 {
        if ledger.score(address) == Some(expected) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!(
        "score for {} is {:?}, expected {}",
        address,
        ledger.score(address),
        expected
    );
}
