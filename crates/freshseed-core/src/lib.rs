//! freshseed Core - Shared types and protocol definitions
//!
//! This crate provides the foundational types used by both the seed server
//! and the client flows: the wire contract, the client-side [`Seed`] value,
//! the flat [`SeedError`] taxonomy and configuration.

pub mod config;
pub mod error;
pub mod protocol;
pub mod seed;

pub use config::{ClientConfig, ServerConfig};
pub use error::SeedError;
pub use protocol::{SeedResponse, ValidateRequest, ValidateResponse};
pub use seed::Seed;
