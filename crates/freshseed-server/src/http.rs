//! HTTP request handlers
//!
//! - `POST /seed` issues a new seed
//! - `POST /validate` classifies a seed; always `200` for a well-formed request
//! - `GET /info` reports server version and store occupancy

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use freshseed_core::{SeedResponse, ValidateRequest, ValidateResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::state::AppState;

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/seed", post(issue_seed_handler))
        .route("/validate", post(validate_seed_handler))
        .route("/info", get(server_info_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Seed API Handlers
// ============================================================================

/// Issue a new seed
///
/// Returns the seed and its expiry. There is no business rejection path.
async fn issue_seed_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SeedResponse>, (StatusCode, String)> {
    state.seeds.issue().await.map(Json).map_err(|e| {
        warn!("Seed issuance failed: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}

/// Query parameters accepted by `/validate`
#[derive(Debug, Default, Deserialize)]
pub struct SeedQuery {
    seed: Option<String>,
}

/// Validate a seed taken from the `seed` query parameter or the JSON body
async fn validate_seed_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SeedQuery>,
    body: Option<Json<ValidateRequest>>,
) -> Result<Json<ValidateResponse>, (StatusCode, String)> {
    let seed = query
        .seed
        .filter(|s| !s.is_empty())
        .or_else(|| body.map(|Json(request)| request.seed))
        .filter(|s| !s.is_empty())
        .ok_or((StatusCode::BAD_REQUEST, "Missing seed".to_string()))?;

    let outcome = state.seeds.validate(&seed).await;
    info!(
        "Validation: valid={} reason={}",
        outcome.valid,
        outcome.reason.as_deref().unwrap_or("-")
    );
    Ok(Json(outcome))
}

// ============================================================================
// Server Info
// ============================================================================

/// Server information response
#[derive(Debug, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Server version
    pub version: String,
    /// Seed time-to-live in seconds
    pub seed_ttl_secs: u64,
    /// Records currently held, valid or expired
    pub stored_seeds: usize,
}

/// Get server information
async fn server_info_handler(State(state): State<Arc<AppState>>) -> Json<ServerInfo> {
    Json(ServerInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        seed_ttl_secs: state.config.seed_ttl_secs,
        stored_seeds: state.store().len().await,
    })
}
