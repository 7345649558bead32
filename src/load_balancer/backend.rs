//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server by its `host:port` address
//! - Build outbound URLs for the configured scheme
//!
//! Backends are immutable once the pool is built; all mutable per-backend
//! state lives in the traffic ledger.

use axum::http::uri::Authority;
use std::fmt;
use std::str::FromStr;

/// Error returned when a backend address is not a usable `host:port`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendAddressError {
    #[error("backend address `{0}` is not a valid authority")]
    Invalid(String),
    #[error("backend address `{0}` has no port")]
    MissingPort(String),
    #[error("backend address `{0}` must not carry credentials")]
    Userinfo(String),
}

/// Scheme used to reach backends (probes and forwarded requests alike).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    pub fn from_https(https: bool) -> Self {
        if https { Scheme::Https } else { Scheme::Http }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single backend server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Backend {
    authority: Authority,
}

impl Backend {
    /// Parse a `host:port` address.
    pub fn parse(address: &str) -> Result<Self, BackendAddressError> {
        let authority = Authority::from_str(address.trim())
            .map_err(|_| BackendAddressError::Invalid(address.to_string()))?;

        if authority.as_str().contains('@') {
            return Err(BackendAddressError::Userinfo(address.to_string()));
        }
        if authority.port_u16().is_none() {
            return Err(BackendAddressError::MissingPort(address.to_string()));
        }

        Ok(Self { authority })
    }

    /// The `host:port` address, also the backend's key in the ledger.
    pub fn address(&self) -> &str {
        self.authority.as_str()
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Absolute URL for `path_and_query` on this backend.
    pub fn url(&self, scheme: Scheme, path_and_query: &str) -> String {
        let path = if path_and_query.starts_with('/') { path_and_query } else { "/" };
        format!("{}://{}{}", scheme, self.authority, path)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.address())
    }
}

impl FromStr for Backend {
    type Err = BackendAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Backend::parse(s)
    }
}
