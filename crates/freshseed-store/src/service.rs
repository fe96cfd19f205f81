//! Seed issuance and validation
//!
//! Issuance never rejects: it draws a random seed, registers it and hands it
//! back with its expiry. Validation classifies any string without side
//! effects, so a live seed validates as true until its TTL elapses.

use crate::store::{RecordStatus, SeedStore, StoreResult};
use freshseed_core::{SeedResponse, ValidateResponse};
use rand::RngCore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Number of random bytes in a seed (hex-encoded to twice as many characters)
pub const SEED_BYTES: usize = 16;

/// Issues and validates seeds against a shared [`SeedStore`]
pub struct SeedService {
    store: Arc<SeedStore>,
    ttl: Duration,
}

impl SeedService {
    pub fn new(store: Arc<SeedStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<SeedStore> {
        &self.store
    }

    /// Issue a fresh seed
    pub async fn issue(&self) -> StoreResult<SeedResponse> {
        let seed = generate_seed_value();
        let expires_at = self.store.register(&seed, self.ttl).await?;

        info!("Issued seed expiring at {}", expires_at);
        Ok(SeedResponse { seed, expires_at })
    }

    /// Classify a seed value
    pub async fn validate(&self, seed: &str) -> ValidateResponse {
        let status = self.store.lookup(seed).await;
        debug!("Validated seed: {:?}", status);

        match status {
            RecordStatus::NotFound => ValidateResponse::not_found(),
            RecordStatus::Expired => ValidateResponse::expired(),
            RecordStatus::Valid => ValidateResponse::valid(),
        }
    }
}

/// Generate a random hex seed from [`SEED_BYTES`] bytes of OS-seeded randomness
pub fn generate_seed_value() -> String {
    let mut bytes = [0u8; SEED_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
