//! freshseed Server - Axum-based HTTP API
//!
//! This crate exposes the seed lifecycle over HTTP/JSON.

pub mod http;
pub mod state;

pub use http::create_router;
pub use state::AppState;
