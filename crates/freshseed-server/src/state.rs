//! Shared application state

use freshseed_core::ServerConfig;
use freshseed_store::{Clock, SeedService, SeedStore, SystemClock};
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    /// Configuration
    pub config: ServerConfig,
    /// Issuance and validation over the shared store
    pub seeds: Arc<SeedService>,
}

impl AppState {
    /// Create a new application state around an existing service
    pub fn new(config: ServerConfig, seeds: Arc<SeedService>) -> Self {
        Self { config, seeds }
    }

    /// Build the store and service from configuration using the given clock
    pub fn from_config(config: ServerConfig, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(SeedStore::new(clock, config.eviction_grace()));
        let seeds = Arc::new(SeedService::new(store, config.seed_ttl()));
        Self::new(config, seeds)
    }

    /// Build the store and service from configuration on the system clock
    pub fn with_system_clock(config: ServerConfig) -> Self {
        Self::from_config(config, Arc::new(SystemClock))
    }

    /// The seed store backing this state
    pub fn store(&self) -> Arc<SeedStore> {
        self.seeds.store().clone()
    }
}
