//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts and interval between 1s and one year)
//! - Validate backend addresses and reject duplicates
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - An empty pool is valid; requests are then answered with 503

use std::collections::HashSet;

use crate::config::schema::BalancerConfig;
use crate::load_balancer::backend::{Backend, BackendAddressError};

/// Upper bound for every duration given in seconds.
pub const MAX_SECONDS: u64 = 365 * 24 * 60 * 60;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
    #[error("timeouts.connect_secs must be greater than zero")]
    ZeroConnectTimeout,
    #[error("health_check.interval_secs must be greater than zero")]
    ZeroHealthInterval,
    #[error("{0} must not exceed {MAX_SECONDS} seconds")]
    OutOfRange(&'static str),
    #[error("health_check.path `{0}` must start with `/`")]
    HealthPath(String),
    #[error(transparent)]
    Backend(#[from] BackendAddressError),
    #[error("backend `{0}` is listed more than once")]
    DuplicateBackend(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroConnectTimeout);
    }
    if config.health_check.interval_secs == 0 {
        errors.push(ValidationError::ZeroHealthInterval);
    }
    for (field, secs) in [
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("health_check.interval_secs", config.health_check.interval_secs),
    ] {
        if secs > MAX_SECONDS {
            errors.push(ValidationError::OutOfRange(field));
        }
    }
    if !config.health_check.path.starts_with('/') {
        errors.push(ValidationError::HealthPath(config.health_check.path.clone()));
    }

    let mut seen = HashSet::new();
    for address in &config.backends.addresses {
        match Backend::parse(address) {
            Ok(backend) => {
                if !seen.insert(backend.address().to_string()) {
                    errors.push(ValidationError::DuplicateBackend(address.clone()));
                }
            }
            Err(e) => errors.push(e.into()),
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
