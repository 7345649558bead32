//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe each backend from its own task
//! - Write the unavailable sentinel into the ledger when a probe fails

use std::sync::Arc;
use std::time::Duration;

use axum::http::{StatusCode, header};
use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::BalancerConfig;
use crate::health::supervisor::HealthSupervisor;
use crate::lifecycle::Shutdown;
use crate::load_balancer::{Scheme, TrafficLedger, backend::Backend};
use crate::observability::metrics;

const USER_AGENT: &str = "traffic-balancer-health-check";

/// How and how often backends are probed.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub scheme: Scheme,
    pub path: String,
    pub interval: Duration,
    pub timeout: Duration,
}

impl ProbeSettings {
    pub fn from_config(config: &BalancerConfig) -> Self {
        Self {
            scheme: config.scheme(),
            path: config.health_check.path.clone(),
            interval: config.health_check.interval(),
            timeout: config.timeouts.request(),
        }
    }
}

pub struct HealthMonitor {
    ledger: Arc<TrafficLedger>,
    client: reqwest::Client,
    settings: ProbeSettings,
}

impl HealthMonitor {
    pub fn new(ledger: Arc<TrafficLedger>, client: reqwest::Client, settings: ProbeSettings) -> Self {
        Self {
            ledger,
            client,
            settings,
        }
    }

    /// Spawn one polling task per backend.
    ///
    /// Tasks run until `shutdown` is triggered.
    pub fn spawn(self: Arc<Self>, backends: &[Backend], shutdown: &Shutdown) -> HealthSupervisor {
        tracing::info!(
            backends = backends.len(),
            interval = ?self.settings.interval,
            path = %self.settings.path,
            "Health monitor starting"
        );

        let mut supervisor = HealthSupervisor::default();
        for backend in backends {
            let monitor = self.clone();
            let backend = backend.clone();
            let address = backend.address().to_string();
            let shutdown = shutdown.subscribe();
            supervisor.push(address, tokio::spawn(monitor.run(backend, shutdown)));
        }
        supervisor
    }

    async fn run(self: Arc<Self>, backend: Backend, mut shutdown: broadcast::Receiver<()>) {
        let interval = self.settings.interval;
        // First probe only after a full interval.
        let Some(start) = Instant::now().checked_add(interval) else {
            tracing::warn!(addr = %backend, interval = ?interval, "Health interval out of range, probing disabled");
            let _ = shutdown.recv().await;
            return;
        };
        let mut ticker = time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check(&backend).await;
                }
                _ = shutdown.recv() => {
                    tracing::debug!(addr = %backend, "Health task received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe `backend` once and record a failure in the ledger.
    /// A healthy result leaves the ledger untouched.
    pub async fn check(&self, backend: &Backend) -> bool {
        let healthy = self.probe(backend).await;
        if !healthy {
            self.ledger.mark_unavailable(backend.address());
        }

        metrics::record_backend_health(backend.address(), healthy);
        healthy
    }

    /// Issue `GET {path}` and report whether it answered exactly 200.
    pub async fn probe(&self, backend: &Backend) -> bool {
        let url = backend.url(self.settings.scheme, &self.settings.path);

        let result = self
            .client
            .get(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .timeout(self.settings.timeout)
            .send()
            .await;

        match result {
            Ok(response) if response.status() == StatusCode::OK => {
                tracing::debug!(addr = %backend, "Health check passed");
                true
            }
            Ok(response) => {
                tracing::warn!(addr = %backend, status = %response.status(), "Health check failed: non-OK status");
                false
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!(addr = %backend, "Health check failed: timeout");
                false
            }
            Err(e) => {
                tracing::warn!(addr = %backend, error = %e, "Health check failed: connection error");
                false
            }
        }
    }
}
