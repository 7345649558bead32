//! Command line interface.
//!
//! Flags override values from the optional configuration file; the merged
//! result is validated once.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{BalancerConfig, ConfigError, read_config, validate_config};

#[derive(Parser, Debug)]
#[command(name = "traffic-balancer")]
#[command(version, about = "HTTP load balancer that routes each request to the backend with the least traffic", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Load balancer port
    #[arg(long)]
    pub port: Option<u16>,

    /// Request and health probe timeout in seconds
    #[arg(long = "timeout-sec", value_name = "SECS")]
    pub timeout_sec: Option<u64>,

    /// Reach backends over HTTPS
    #[arg(long)]
    pub https: bool,

    /// Include the serving backend in an `lb-from` response header
    #[arg(long)]
    pub trace: bool,

    /// Backend address; repeat to list the whole pool in selection order
    #[arg(long = "backend", value_name = "HOST:PORT")]
    pub backends: Vec<String>,

    /// Seconds between health probes
    #[arg(long = "health-interval-sec", value_name = "SECS")]
    pub health_interval_sec: Option<u64>,

    /// Log level when RUST_LOG is unset
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Build the effective configuration.
    pub fn load(&self) -> Result<BalancerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => BalancerConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut BalancerConfig) {
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(secs) = self.timeout_sec {
            config.timeouts.request_secs = secs;
        }
        if self.https {
            config.backends.https = true;
        }
        if self.trace {
            config.backends.trace = true;
        }
        if !self.backends.is_empty() {
            config.backends.addresses = self.backends.clone();
        }
        if let Some(secs) = self.health_interval_sec {
            config.health_check.interval_secs = secs;
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
    }
}
