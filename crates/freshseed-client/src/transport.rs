//! Outbound HTTP seam
//!
//! Everything above this module talks to a [`Transport`]; the production
//! implementation is reqwest-backed. A transport reports every HTTP response
//! as `Ok`, whatever its status. Only failures to exchange a response at all
//! (refused, reset, timed out) are errors.

use async_trait::async_trait;
use freshseed_core::protocol::TRANSIENT_STATUSES;
use freshseed_core::ValidateRequest;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Transport-level failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(String),
}

/// A request to the seed server; all endpoints are `POST`
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub path: &'static str,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// `POST /seed`
    pub fn issue_seed() -> Self {
        Self {
            path: "/seed",
            body: None,
        }
    }

    /// `POST /validate` with `{ "seed": value }`
    pub fn validate_seed(value: &str) -> Self {
        let request = ValidateRequest {
            seed: value.to_string(),
        };
        Self {
            path: "/validate",
            body: serde_json::to_value(request).ok(),
        }
    }
}

/// A raw HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 502, 503 or 504
    pub fn is_transient(&self) -> bool {
        TRANSIENT_STATUSES.contains(&self.status)
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Sends requests to the seed server
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// reqwest-backed transport
///
/// No request timeout is configured; callers that need bounded latency wrap
/// the call in their own deadline.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url(request.path);
        debug!("POST {}", url);

        let mut builder = self.client.post(&url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Io(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Io(e.to_string()))?;

        Ok(ApiResponse::new(status, body.to_vec()))
    }
}
