//! Use cases: repository calls narrowed to [`SeedError`] kinds

use crate::repository::SeedRepository;
use freshseed_core::{Seed, SeedError};
use tracing::warn;

/// Request a fresh seed
pub async fn generate_seed(repository: &dyn SeedRepository) -> Result<Seed, SeedError> {
    repository.new_seed().await.map_err(|e| {
        warn!("Seed generation failed: {}", e);
        SeedError::from(&e)
    })
}

/// Ask whether `value` is a live seed
pub async fn validate_seed(repository: &dyn SeedRepository, value: &str) -> Result<bool, SeedError> {
    repository.validate_seed(value).await.map_err(|e| {
        warn!("Seed validation failed: {}", e);
        SeedError::from(&e)
    })
}
