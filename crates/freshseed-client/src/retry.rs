//! Bounded retry for transient failures
//!
//! A request is retried after a fixed delay when the transport fails to
//! exchange a response at all, or when the server answers 502/503/504. Every
//! other status is handed back immediately. Once the budget is spent the last
//! failure (error or response) is returned as-is.

use crate::transport::{ApiRequest, ApiResponse, Transport, TransportError};
use async_trait::async_trait;
use freshseed_core::ClientConfig;
use std::time::Duration;
use tracing::warn;

/// Default number of retransmissions
pub const MAX_RETRIES: u32 = 1;

/// Default delay between attempts
pub const RETRY_DELAY: Duration = Duration::from_millis(1300);

/// How many times, and how far apart, to retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retransmissions allowed after the first attempt
    pub max_retries: u32,
    /// Fixed delay before each retransmission
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            delay: RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.max_retries, config.retry_delay())
    }
}

/// A [`Transport`] that retries another transport under a [`RetryPolicy`]
pub struct RetryingClient<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryingClient<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for RetryingClient<T> {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut attempt = 0;

        loop {
            match self.inner.send(request).await {
                Ok(response) if response.is_transient() && attempt < self.policy.max_retries => {
                    warn!(
                        "{} answered {}, retrying ({}/{})",
                        request.path,
                        response.status,
                        attempt + 1,
                        self.policy.max_retries
                    );
                }
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.policy.max_retries => {
                    warn!(
                        "{} failed: {}, retrying ({}/{})",
                        request.path,
                        e,
                        attempt + 1,
                        self.policy.max_retries
                    );
                }
                Err(e) => return Err(e),
            }

            tokio::time::sleep(self.policy.delay).await;
            attempt += 1;
        }
    }
}
