//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build every subsystem from the validated configuration
//! - Create the Axum Router that proxies any method and path
//! - Wire up middleware (tracing, request ID)
//! - Run health monitoring alongside the listener
//! - Stop both on shutdown

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::BalancerConfig;
use crate::health::{HealthMonitor, ProbeSettings};
use crate::http::client::build_client;
use crate::http::forward::{ForwardSettings, Forwarder};
use crate::http::request::{UuidRequestId, X_REQUEST_ID, request_id};
use crate::lifecycle::Shutdown;
use crate::load_balancer::{BackendAddressError, BackendManager, TrafficLedger};
use crate::observability::metrics;

/// Body sent when the pool has nothing to offer.
pub const NO_BACKEND_BODY: &str = "No available servers";

/// Startup failures.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid backend: {0}")]
    Backend(#[from] BackendAddressError),
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub backends: Arc<BackendManager>,
    pub forwarder: Arc<Forwarder>,
}

/// HTTP server for the load balancer.
pub struct HttpServer {
    router: Router,
    config: BalancerConfig,
    backend_manager: Arc<BackendManager>,
    monitor: Arc<HealthMonitor>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: BalancerConfig) -> Result<Self, ServerError> {
        let backend_manager = Arc::new(BackendManager::from_addresses(config.backends.addresses.as_slice())?);
        let client = build_client(&config.timeouts)?;

        let forwarder = Arc::new(Forwarder::new(
            client.clone(),
            backend_manager.ledger().clone(),
            ForwardSettings::from_config(&config),
        ));
        let monitor = Arc::new(HealthMonitor::new(
            backend_manager.ledger().clone(),
            client,
            ProbeSettings::from_config(&config),
        ));

        let state = AppState {
            backends: backend_manager.clone(),
            forwarder,
        };

        let router = Self::build_router(state);
        Ok(Self {
            router,
            config,
            backend_manager,
            monitor,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backends = self.backend_manager.all_backends().len(),
            trace = self.config.backends.trace,
            "HTTP server starting"
        );

        let supervisor = self.monitor.clone().spawn(self.backend_manager.all_backends(), &shutdown);

        let mut stop = shutdown.subscribe();
        let served = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
            })
            .await;

        // Health tasks share the signal; make sure they see it even when the
        // server ended on its own.
        shutdown.trigger();
        supervisor.join().await;

        served?;
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Router with state and middleware, for serving without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn ledger(&self) -> Arc<TrafficLedger> {
        self.backend_manager.ledger().clone()
    }

    pub fn backends(&self) -> &Arc<BackendManager> {
        &self.backend_manager
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &BalancerConfig {
        &self.config
    }
}

/// Main proxy handler.
/// Selects the least loaded backend and forwards the request.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&request);
    let method = request.method().to_string();

    let Some(backend) = state.backends.select() else {
        tracing::warn!(request_id = %request_id, "No available servers");
        metrics::record_request(&method, 503, "none", start_time);
        return (StatusCode::SERVICE_UNAVAILABLE, NO_BACKEND_BODY).into_response();
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %request.uri().path(),
        backend = %backend,
        "Proxying request"
    );

    match state.forwarder.forward(backend, request).await {
        Ok(response) => {
            metrics::record_request(&method, response.status().as_u16(), backend.address(), start_time);
            response
        }
        Err(e) => {
            let status = e.status_code();
            tracing::error!(request_id = %request_id, backend = %backend, error = %e, "Forward failed");
            metrics::record_request(&method, status.as_u16(), backend.address(), start_time);
            status.into_response()
        }
    }
}
