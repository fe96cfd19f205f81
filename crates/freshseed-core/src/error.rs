//! Error taxonomy surfaced to the presentation layer

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Flat set of failure kinds a flow can end in
///
/// Transport and repository failures are narrowed to one of these before they
/// reach a flow; the flow only ever turns a kind into display text.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeedError {
    #[error("no internet connection")]
    NoInternetConnection,

    #[error("server error")]
    ServerError,

    /// Reserved; no client path currently produces it.
    #[error("expired token")]
    ExpiredToken,

    #[error("invalid QR generation")]
    InvalidQrGeneration,

    #[error("unknown error")]
    Unknown,
}

impl SeedError {
    /// All kinds, in declaration order
    pub const ALL: [SeedError; 5] = [
        SeedError::NoInternetConnection,
        SeedError::ServerError,
        SeedError::ExpiredToken,
        SeedError::InvalidQrGeneration,
        SeedError::Unknown,
    ];
}
