//! HTTP/JSON wire types shared by the seed server and its clients
//!
//! - `POST /seed` returns [`SeedResponse`]
//! - `POST /validate` takes [`ValidateRequest`] and returns [`ValidateResponse`]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reason reported for a seed the server has never issued (or has evicted)
pub const REASON_NOT_FOUND: &str = "Seed not found";

/// Reason reported for a seed whose time-to-live has elapsed
pub const REASON_EXPIRED: &str = "Seed expired";

/// Gateway-class statuses a client may retry
pub const TRANSIENT_STATUSES: std::ops::RangeInclusive<u16> = 502..=504;

/// Response to `POST /seed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedResponse {
    /// The issued token
    pub seed: String,
    /// Expiry instant, ISO-8601 UTC with millisecond precision
    #[serde(with = "millis_timestamp")]
    pub expires_at: DateTime<Utc>,
}

/// Body of `POST /validate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateRequest {
    pub seed: String,
}

/// Response to `POST /validate`
///
/// Business-level invalidity is carried here, never as a transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    /// Why the seed was rejected; omitted when valid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ValidateResponse {
    pub fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn not_found() -> Self {
        Self {
            valid: false,
            reason: Some(REASON_NOT_FOUND.to_string()),
        }
    }

    pub fn expired() -> Self {
        Self {
            valid: false,
            reason: Some(REASON_EXPIRED.to_string()),
        }
    }
}

/// `yyyy-MM-ddTHH:mm:ss.SSSZ` timestamps
pub mod millis_timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| D::Error::custom(format!("invalid timestamp {:?}: {}", raw, e)))
    }
}
