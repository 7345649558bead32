//! Backend pool management.
//!
//! # Responsibilities
//! - Own the fixed, ordered list of backends
//! - Own the traffic ledger built from that list
//! - Apply the load balancing algorithm to a ledger snapshot

use std::sync::Arc;

use crate::load_balancer::{
    LoadBalancer,
    backend::{Backend, BackendAddressError},
    least_traffic::LeastTraffic,
    ledger::TrafficLedger,
};

/// Manages the backend pool and its traffic ledger.
#[derive(Debug)]
pub struct BackendManager {
    backends: Vec<Backend>,
    ledger: Arc<TrafficLedger>,
    balancer: Box<dyn LoadBalancer>,
}

impl BackendManager {
    /// Create a manager using the least traffic strategy.
    pub fn new(backends: Vec<Backend>) -> Self {
        Self::with_balancer(backends, Box::new(LeastTraffic::new()))
    }

    pub fn with_balancer(backends: Vec<Backend>, balancer: Box<dyn LoadBalancer>) -> Self {
        let ledger = Arc::new(TrafficLedger::new(
            backends.iter().map(|b| b.address().to_string()),
        ));

        Self {
            backends,
            ledger,
            balancer,
        }
    }

    /// Parse configured addresses, keeping their order.
    pub fn from_addresses<S: AsRef<str>>(addresses: &[S]) -> Result<Self, BackendAddressError> {
        let backends = addresses
            .iter()
            .map(|a| Backend::parse(a.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(backends))
    }

    /// Select a backend for the next request.
    /// Returns `None` only when the pool is empty.
    pub fn select(&self) -> Option<&Backend> {
        let snapshot = self.ledger.snapshot();
        let selected = self.balancer.next_server(&self.backends, &snapshot);

        if selected.is_none() {
            tracing::debug!(backend_count = self.backends.len(), "No backend available");
        }
        selected
    }

    /// All backends in pool order (for health checking).
    pub fn all_backends(&self) -> &[Backend] {
        &self.backends
    }

    pub fn ledger(&self) -> &Arc<TrafficLedger> {
        &self.ledger
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}
