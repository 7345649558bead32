//! Outbound HTTP client shared by the forwarder and the health monitor.

use reqwest::redirect::Policy;

use crate::config::TimeoutConfig;

/// Build the upstream client.
///
/// Redirects are relayed to the caller, never followed, and system proxy
/// settings are ignored. Per-request deadlines are set by each caller.
pub fn build_client(timeouts: &TimeoutConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(timeouts.connect())
        .redirect(Policy::none())
        .no_proxy()
        .build()
}
