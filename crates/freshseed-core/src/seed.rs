//! Client-side seed value

use chrono::{DateTime, Utc};

use crate::protocol::SeedResponse;

/// A seed issued by the server, as held by the generating device
///
/// Immutable; every successful issuance produces a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    /// Opaque token value encoded into the QR code
    pub value: String,
    /// UTC instant after which the server reports the seed as expired
    pub expires_at: DateTime<Utc>,
}

impl Seed {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// Whole seconds left before expiry, floored at zero
    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining_at(Utc::now())
    }

    /// Whole seconds left before expiry as seen at `now`
    pub fn seconds_remaining_at(&self, now: DateTime<Utc>) -> u32 {
        let millis = (self.expires_at - now).num_milliseconds();
        (millis / 1000).clamp(0, u32::MAX as i64) as u32
    }
}

impl From<SeedResponse> for Seed {
    fn from(response: SeedResponse) -> Self {
        Self {
            value: response.seed,
            expires_at: response.expires_at,
        }
    }
}
