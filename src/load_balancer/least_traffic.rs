//! Least traffic load balancing strategy.

use crate::load_balancer::{LoadBalancer, backend::Backend, ledger::Snapshot};

/// Least traffic selector.
/// Selects the backend with the lowest ledger score.
///
/// Scores are compared as plain integers, so a backend holding the
/// unavailable sentinel (-1) ranks below every backend that has served
/// traffic and is picked first.
#[derive(Debug, Default)]
pub struct LeastTraffic;

impl LeastTraffic {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for LeastTraffic {
    fn next_server<'a>(&self, backends: &'a [Backend], snapshot: &Snapshot) -> Option<&'a Backend> {
        select(backends, snapshot)
    }
}

/// Pick the backend with the minimum score, scanning in pool order.
/// The first backend seen wins ties; a backend missing from the snapshot
/// counts as 0.
pub fn select<'a>(backends: &'a [Backend], snapshot: &Snapshot) -> Option<&'a Backend> {
    let mut selected: Option<(&Backend, i64)> = None;

    for backend in backends {
        let score = snapshot.get(backend.address()).copied().unwrap_or(0);
        match selected {
            Some((_, min)) if score >= min => {}
            _ => selected = Some((backend, score)),
        }
    }

    selected.map(|(backend, _)| backend)
}
