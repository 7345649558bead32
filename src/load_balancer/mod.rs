//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → pool.rs (fixed, ordered backends)
//!     → ledger.rs (snapshot of per-backend scores)
//!     → least_traffic.rs (pick backend with the lowest score)
//!     → forwarder relays the request and adds response bytes to the ledger
//!
//! Health monitor
//!     → ledger.rs (write unavailable sentinel on failed probe)
//! ```
//!
//! # Design Decisions
//! - The pool is fixed at startup; no dynamic registration
//! - Selection is a pure function of the pool order and a ledger snapshot
//! - The ledger is the only shared mutable state

pub mod backend;
pub mod least_traffic;
pub mod ledger;
pub mod pool;

use crate::load_balancer::backend::Backend;
use crate::load_balancer::ledger::Snapshot;

pub use backend::{BackendAddressError, Scheme};
pub use ledger::{TrafficLedger, UNAVAILABLE};
pub use pool::BackendManager;

/// A load balancing algorithm.
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    /// Choose a backend given the current ledger scores.
    fn next_server<'a>(&self, backends: &'a [Backend], snapshot: &Snapshot) -> Option<&'a Backend>;
}
