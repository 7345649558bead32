//! Bookkeeping for the per-backend health tasks.

use tokio::task::JoinHandle;

/// Handles of every health task spawned at startup, keyed by backend address.
#[derive(Debug, Default)]
pub struct HealthSupervisor {
    tasks: Vec<(String, JoinHandle<()>)>,
}

impl HealthSupervisor {
    pub(crate) fn push(&mut self, address: String, handle: JoinHandle<()>) {
        self.tasks.push((address, handle));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Addresses being monitored, in pool order.
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|(address, _)| address.as_str())
    }

    /// Wait for every task to finish. Call after triggering shutdown.
    pub async fn join(self) {
        for (address, handle) in self.tasks {
            if let Err(e) = handle.await {
                tracing::error!(addr = %address, error = %e, "Health task ended abnormally");
            }
        }
        tracing::info!("Health monitor stopped");
    }
}
