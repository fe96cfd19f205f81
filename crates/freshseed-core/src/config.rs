//! Configuration types for freshseed

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Seed server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to
    pub bind: IpAddr,
    /// Server port
    pub port: u16,
    /// How long an issued seed validates as true, in seconds
    pub seed_ttl_secs: u64,
    /// Interval between store sweeps, in seconds
    pub sweep_interval_secs: u64,
    /// How long an expired record is kept before the sweep evicts it, in seconds
    pub eviction_grace_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            seed_ttl_secs: 5 * 60,
            sweep_interval_secs: 60,
            eviction_grace_secs: 5 * 60,
        }
    }
}

impl ServerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: set bind address
    pub fn with_bind(mut self, bind: IpAddr) -> Self {
        self.bind = bind;
        self
    }

    /// Builder pattern: set port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builder pattern: set seed TTL
    pub fn with_seed_ttl_secs(mut self, secs: u64) -> Self {
        self.seed_ttl_secs = secs;
        self
    }

    /// Builder pattern: set sweep interval
    pub fn with_sweep_interval_secs(mut self, secs: u64) -> Self {
        self.sweep_interval_secs = secs;
        self
    }

    /// Builder pattern: set eviction grace
    pub fn with_eviction_grace_secs(mut self, secs: u64) -> Self {
        self.eviction_grace_secs = secs;
        self
    }

    pub fn seed_ttl(&self) -> Duration {
        Duration::from_secs(self.seed_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn eviction_grace(&self) -> Duration {
        Duration::from_secs(self.eviction_grace_secs)
    }

    /// Socket address the server listens on
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::new(self.bind, self.port)
    }
}

/// Client configuration shared by the generating and scanning devices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the seed server, e.g. `http://192.168.1.10:3000`
    pub server_url: String,
    /// Maximum number of retransmissions per request
    pub max_retries: u32,
    /// Delay between attempts, in milliseconds
    pub retry_delay_ms: u64,
    /// Side length of the rendered QR image, in pixels
    pub qr_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3000".to_string(),
            max_retries: 1,
            retry_delay_ms: 1300,
            qr_size: 500,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: set server URL
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    /// Builder pattern: set retry budget
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Builder pattern: set retry delay
    pub fn with_retry_delay_ms(mut self, ms: u64) -> Self {
        self.retry_delay_ms = ms;
        self
    }

    /// Builder pattern: set QR image size
    pub fn with_qr_size(mut self, size: u32) -> Self {
        self.qr_size = size;
        self
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
