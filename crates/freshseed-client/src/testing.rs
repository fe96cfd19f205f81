//! Test doubles shared by the client's unit tests

use crate::qr::{QrEncoder, QrImage};
use crate::repository::{RepositoryError, SeedRepository};
use crate::transport::{ApiRequest, ApiResponse, Transport, TransportError};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use freshseed_core::Seed;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Transport replaying a fixed script of outcomes, one per call
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<ApiResponse, TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn statuses(statuses: &[u16]) -> Self {
        Self::new(
            statuses
                .iter()
                .map(|status| Ok(ApiResponse::new(*status, "{}")))
                .collect(),
        )
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport script exhausted")
    }
}

pub fn io_error() -> TransportError {
    TransportError::Io("connection refused".to_string())
}

/// A seed whose whole-second remainder is `secs` right now
pub fn seed_expiring_in(value: &str, secs: i64) -> Seed {
    Seed::new(value, Utc::now() + ChronoDuration::seconds(secs) + ChronoDuration::milliseconds(500))
}

/// Repository answering from queued results, optionally after a delay
#[derive(Default)]
pub struct MockRepository {
    seeds: Mutex<VecDeque<(Duration, Result<Seed, RepositoryError>)>>,
    verdicts: Mutex<VecDeque<(Duration, Result<bool, RepositoryError>)>>,
    seed_calls: AtomicUsize,
    validate_calls: AtomicUsize,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_seed(&self, result: Result<Seed, RepositoryError>) -> &Self {
        self.push_seed_after(Duration::ZERO, result)
    }

    pub fn push_seed_after(&self, delay: Duration, result: Result<Seed, RepositoryError>) -> &Self {
        self.seeds.lock().unwrap().push_back((delay, result));
        self
    }

    pub fn push_verdict(&self, result: Result<bool, RepositoryError>) -> &Self {
        self.push_verdict_after(Duration::ZERO, result)
    }

    pub fn push_verdict_after(&self, delay: Duration, result: Result<bool, RepositoryError>) -> &Self {
        self.verdicts.lock().unwrap().push_back((delay, result));
        self
    }

    pub fn seed_calls(&self) -> usize {
        self.seed_calls.load(Ordering::SeqCst)
    }

    pub fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SeedRepository for MockRepository {
    async fn new_seed(&self) -> Result<Seed, RepositoryError> {
        self.seed_calls.fetch_add(1, Ordering::SeqCst);
        let (delay, result) = self
            .seeds
            .lock()
            .unwrap()
            .pop_front()
            .expect("no seed queued");
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn validate_seed(&self, _value: &str) -> Result<bool, RepositoryError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        let (delay, result) = self
            .verdicts
            .lock()
            .unwrap()
            .pop_front()
            .expect("no verdict queued");
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }
}

/// Encoder producing a blank image of the requested size
pub struct StubEncoder;

impl QrEncoder for StubEncoder {
    fn encode(&self, _text: &str, size: u32) -> Option<QrImage> {
        Some(QrImage::new(size, size))
    }
}

/// Encoder that always fails
pub struct FailingEncoder;

impl QrEncoder for FailingEncoder {
    fn encode(&self, _text: &str, _size: u32) -> Option<QrImage> {
        None
    }
}
