//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → HTTP server stops accepting and drains
//!             → health tasks leave their polling loops
//! ```
//!
//! # Design Decisions
//! - One broadcast channel reaches every long-running task
//! - Nothing is persisted; shutdown only stops work

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
