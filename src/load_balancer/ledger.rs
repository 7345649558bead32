//! Traffic ledger.
//!
//! # Responsibilities
//! - Hold one load score per backend for the lifetime of the process
//! - Accumulate forwarded response bytes per backend
//! - Record the "last probe failed" sentinel
//!
//! # Design Decisions
//! - One `Mutex` guards the whole map so a snapshot is a single consistent read
//! - The lock is never held across an `.await`
//! - Entries are created once from the pool; unknown addresses are ignored

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Score written by the health monitor when a probe fails.
pub const UNAVAILABLE: i64 = -1;

/// Point-in-time copy of every ledger entry.
pub type Snapshot = HashMap<String, i64>;

/// Per-backend load scores shared by the forwarder, the selector and the
/// health monitor.
#[derive(Debug, Default)]
pub struct TrafficLedger {
    scores: Mutex<HashMap<String, i64>>,
}

impl TrafficLedger {
    /// Create a ledger with a zero score for every address.
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let scores = addresses.into_iter().map(|a| (a.into(), 0)).collect();
        Self {
            scores: Mutex::new(scores),
        }
    }

    // The map only holds integers, so a panic elsewhere cannot leave it
    // half-updated.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, i64>> {
        self.scores.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy all entries under a single lock acquisition.
    pub fn snapshot(&self) -> Snapshot {
        self.lock().clone()
    }

    /// Current score for one backend.
    pub fn score(&self, address: &str) -> Option<i64> {
        self.lock().get(address).copied()
    }

    /// Add `delta` to the backend's score.
    ///
    /// The addition is relative to whatever is stored, including the
    /// [`UNAVAILABLE`] sentinel.
    pub fn add(&self, address: &str, delta: i64) {
        if delta == 0 {
            return;
        }

        let mut scores = self.lock();
        match scores.get_mut(address) {
            Some(score) => *score = score.saturating_add(delta),
            None => {
                drop(scores);
                tracing::error!(address = %address, delta, "Traffic recorded for unknown backend");
            }
        }
    }

    /// Overwrite the backend's score with [`UNAVAILABLE`].
    pub fn mark_unavailable(&self, address: &str) {
        let mut scores = self.lock();
        match scores.get_mut(address) {
            Some(score) => *score = UNAVAILABLE,
            None => {
                drop(scores);
                tracing::error!(address = %address, "Unknown backend marked unavailable");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
