//! Least-traffic HTTP load balancer library.

pub mod cli;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;

pub use config::schema::BalancerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
