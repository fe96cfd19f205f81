//! Seed repository: wire responses in, domain values out
//!
//! Raw transport failures never leave this module; they become either a
//! connection failure or a server failure.

use crate::transport::{ApiRequest, ApiResponse, Transport, TransportError};
use async_trait::async_trait;
use freshseed_core::{Seed, SeedError, SeedResponse, ValidateResponse};
use thiserror::Error;
use tracing::debug;

/// Repository errors
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Connection error: {0}")]
    Connection(#[from] TransportError),
    #[error("Server error: HTTP {status}")]
    Server { status: u16 },
    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Narrow to the presentation-facing error kind
impl From<&RepositoryError> for SeedError {
    fn from(error: &RepositoryError) -> Self {
        match error {
            RepositoryError::Connection(_) => SeedError::NoInternetConnection,
            RepositoryError::Server { .. } => SeedError::ServerError,
            RepositoryError::Malformed(_) => SeedError::Unknown,
        }
    }
}

/// Source of seeds and seed verdicts
#[async_trait]
pub trait SeedRepository: Send + Sync {
    /// Ask the server for a fresh seed
    async fn new_seed(&self) -> Result<Seed, RepositoryError>;

    /// Ask the server whether `value` is a live seed
    async fn validate_seed(&self, value: &str) -> Result<bool, RepositoryError>;
}

/// [`SeedRepository`] over any [`Transport`]
pub struct HttpSeedRepository<T> {
    transport: T,
}

impl<T: Transport> HttpSeedRepository<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn exchange(&self, request: ApiRequest) -> Result<ApiResponse, RepositoryError> {
        let response = self.transport.send(&request).await?;
        if !response.is_success() {
            return Err(RepositoryError::Server {
                status: response.status,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl<T: Transport> SeedRepository for HttpSeedRepository<T> {
    async fn new_seed(&self) -> Result<Seed, RepositoryError> {
        let response = self.exchange(ApiRequest::issue_seed()).await?;
        let issued: SeedResponse = response.json()?;
        Ok(issued.into())
    }

    async fn validate_seed(&self, value: &str) -> Result<bool, RepositoryError> {
        let response = self.exchange(ApiRequest::validate_seed(value)).await?;
        let outcome: ValidateResponse = response.json()?;
        if let Some(reason) = &outcome.reason {
            debug!("Seed rejected: {}", reason);
        }
        Ok(outcome.valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{io_error, ScriptedTransport};
    use chrono::{TimeZone, Utc};

    fn repository(script: Vec<Result<ApiResponse, TransportError>>) -> HttpSeedRepository<ScriptedTransport> {
        HttpSeedRepository::new(ScriptedTransport::new(script))
    }

    #[tokio::test]
    async fn test_new_seed_parses_response() {
        let body = r#"{"seed":"0123456789abcdef0123456789abcdef","expires_at":"2024-01-01T00:05:00.000Z"}"#;
        let repo = repository(vec![Ok(ApiResponse::new(200, body))]);

        let seed = repo.new_seed().await.unwrap();
        assert_eq!(seed.value, "0123456789abcdef0123456789abcdef");
        assert_eq!(seed.expires_at, Utc.with_ymd_and_hms(2024, 1, 1, 0, 5, 0).unwrap());
        assert_eq!(repo.transport().requests(), vec![ApiRequest::issue_seed()]);
    }

    #[tokio::test]
    async fn test_validate_seed_returns_verdict() {
        let repo = repository(vec![
            Ok(ApiResponse::new(200, r#"{"valid":true}"#)),
            Ok(ApiResponse::new(200, r#"{"valid":false,"reason":"Seed expired"}"#)),
        ]);

        assert!(repo.validate_seed("abc").await.unwrap());
        assert!(!repo.validate_seed("abc").await.unwrap());
        assert_eq!(repo.transport().requests()[0], ApiRequest::validate_seed("abc"));
    }

    #[tokio::test]
    async fn test_io_failure_is_connection_error() {
        let repo = repository(vec![Err(io_error())]);

        let error = repo.new_seed().await.unwrap_err();
        assert!(matches!(error, RepositoryError::Connection(_)));
        assert_eq!(SeedError::from(&error), SeedError::NoInternetConnection);
    }

    #[tokio::test]
    async fn test_non_success_status_is_server_error() {
        for status in [400, 404, 500, 503] {
            let repo = repository(vec![Ok(ApiResponse::new(status, "oops"))]);

            let error = repo.validate_seed("abc").await.unwrap_err();
            assert!(matches!(error, RepositoryError::Server { status: s } if s == status));
            assert_eq!(SeedError::from(&error), SeedError::ServerError);
        }
    }

    #[tokio::test]
    async fn test_garbage_body_is_unknown() {
        let repo = repository(vec![Ok(ApiResponse::new(200, "<html>"))]);

        let error = repo.new_seed().await.unwrap_err();
        assert!(matches!(error, RepositoryError::Malformed(_)));
        assert_eq!(SeedError::from(&error), SeedError::Unknown);
    }
}
