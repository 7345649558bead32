//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Per-backend task (active.rs):
//!     wait one interval
//!     → GET {scheme}://{backend}/health
//!     → non-200 or error: ledger score := -1
//!     → 200: nothing
//!
//! supervisor.rs:
//!     records every task handle; joined on shutdown
//! ```
//!
//! # Design Decisions
//! - One independent task per backend; a slow backend never delays another probe
//! - No backoff and no jitter; failures are retried on the next tick
//! - A successful probe does not reset a previous sentinel

pub mod active;
pub mod supervisor;

pub use active::{HealthMonitor, ProbeSettings};
pub use supervisor::HealthSupervisor;
