//! Concurrency-safe in-memory registry of issued seeds
//!
//! Records live only for the lifetime of the process. Lookups check the
//! expiry instant themselves, so their answer never depends on when the last
//! sweep ran; the sweep only marks records eagerly and evicts stale ones.

use crate::clock::Clock;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// Store errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Seed already registered: {0}")]
    Duplicate(String),
    #[error("Time-to-live out of range: {0:?}")]
    InvalidTtl(Duration),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Classification of a seed value against the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    NotFound,
    Valid,
    Expired,
}

/// What a single sweep pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Records newly flagged as expired
    pub marked: usize,
    /// Records removed because their grace window ran out
    pub evicted: usize,
    /// Records left in the store
    pub remaining: usize,
}

/// A registered seed
#[derive(Debug, Clone)]
struct SeedRecord {
    expires_at: DateTime<Utc>,
    /// Once set, never cleared
    expired: bool,
}

impl SeedRecord {
    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expired || now >= self.expires_at
    }
}

/// Registry of outstanding seeds keyed by value
pub struct SeedStore {
    records: RwLock<HashMap<String, SeedRecord>>,
    clock: Arc<dyn Clock>,
    /// Time past expiry after which a record is dropped entirely
    eviction_grace: chrono::Duration,
}

impl SeedStore {
    /// Create an empty store
    pub fn new(clock: Arc<dyn Clock>, eviction_grace: Duration) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            clock,
            eviction_grace: chrono::Duration::from_std(eviction_grace)
                .unwrap_or_else(|_| chrono::Duration::days(365 * 100)),
        }
    }

    /// Current time according to the store's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Register a new seed expiring `ttl` from now
    ///
    /// Returns the expiry instant recorded for the seed.
    pub async fn register(&self, value: &str, ttl: Duration) -> StoreResult<DateTime<Utc>> {
        let ttl_delta = chrono::Duration::from_std(ttl).map_err(|_| StoreError::InvalidTtl(ttl))?;
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(ttl_delta)
            .ok_or(StoreError::InvalidTtl(ttl))?;

        let mut records = self.records.write().await;
        if records.contains_key(value) {
            return Err(StoreError::Duplicate(value.to_string()));
        }
        records.insert(
            value.to_string(),
            SeedRecord {
                expires_at,
                expired: false,
            },
        );

        debug!("Registered seed expiring at {}", expires_at);
        Ok(expires_at)
    }

    /// Classify a seed value
    pub async fn lookup(&self, value: &str) -> RecordStatus {
        let now = self.clock.now();
        let records = self.records.read().await;
        match records.get(value) {
            None => RecordStatus::NotFound,
            Some(record) if record.is_expired_at(now) => RecordStatus::Expired,
            Some(_) => RecordStatus::Valid,
        }
    }

    /// Mark every record whose expiry has passed and evict those past grace
    pub async fn sweep(&self) -> SweepReport {
        let now = self.clock.now();
        let grace = self.eviction_grace;
        let mut records = self.records.write().await;

        let mut marked = 0;
        for record in records.values_mut() {
            if !record.expired && now >= record.expires_at {
                record.expired = true;
                marked += 1;
            }
        }

        let before = records.len();
        records.retain(|_, record| match record.expires_at.checked_add_signed(grace) {
            Some(evict_at) => now < evict_at,
            None => true,
        });

        SweepReport {
            marked,
            evicted: before - records.len(),
            remaining: records.len(),
        }
    }

    /// Number of records currently held (valid or expired)
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Whether a record is flagged expired by a sweep (not a lazy check)
    #[cfg(test)]
    async fn is_marked(&self, value: &str) -> Option<bool> {
        self.records.read().await.get(value).map(|r| r.expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    const TTL: Duration = Duration::from_secs(300);

    fn create_test_store(grace: Duration) -> (Arc<SeedStore>, Arc<ManualClock>) {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let store = Arc::new(SeedStore::new(clock.clone(), grace));
        (store, clock)
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let (store, clock) = create_test_store(TTL);

        let expires_at = store.register("abc", TTL).await.unwrap();
        assert_eq!(expires_at, clock.now() + chrono::Duration::seconds(300));

        assert_eq!(store.lookup("abc").await, RecordStatus::Valid);
        assert_eq!(store.lookup("missing").await, RecordStatus::NotFound);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_register_rejected() {
        let (store, _clock) = create_test_store(TTL);

        store.register("abc", TTL).await.unwrap();
        let result = store.register("abc", TTL).await;
        assert_eq!(result, Err(StoreError::Duplicate("abc".to_string())));
    }

    #[tokio::test]
    async fn test_lookup_expires_without_sweep() {
        let (store, clock) = create_test_store(TTL);
        store.register("abc", TTL).await.unwrap();

        clock.advance(chrono::Duration::seconds(299));
        assert_eq!(store.lookup("abc").await, RecordStatus::Valid);

        clock.advance(chrono::Duration::seconds(1));
        assert_eq!(store.lookup("abc").await, RecordStatus::Expired);
        assert_eq!(store.is_marked("abc").await, Some(false));
    }

    #[tokio::test]
    async fn test_sweep_marks_expired() {
        let (store, clock) = create_test_store(TTL);
        store.register("old", TTL).await.unwrap();
        clock.advance(chrono::Duration::seconds(200));
        store.register("new", TTL).await.unwrap();

        clock.advance(chrono::Duration::seconds(150));
        let report = store.sweep().await;

        assert_eq!(report.marked, 1);
        assert_eq!(report.evicted, 0);
        assert_eq!(store.is_marked("old").await, Some(true));
        assert_eq!(store.is_marked("new").await, Some(false));
        assert_eq!(store.lookup("new").await, RecordStatus::Valid);
    }

    #[tokio::test]
    async fn test_expired_flag_is_monotonic() {
        let (store, clock) = create_test_store(TTL);
        store.register("abc", TTL).await.unwrap();

        clock.advance(chrono::Duration::seconds(301));
        store.sweep().await;

        // Winding the clock back must not revive a marked record
        clock.advance(chrono::Duration::seconds(-301));
        assert_eq!(store.lookup("abc").await, RecordStatus::Expired);
        assert_eq!(store.sweep().await.marked, 0);
        assert_eq!(store.is_marked("abc").await, Some(true));
    }

    #[tokio::test]
    async fn test_sweep_evicts_after_grace() {
        let (store, clock) = create_test_store(Duration::from_secs(60));
        store.register("abc", TTL).await.unwrap();

        clock.advance(chrono::Duration::seconds(330));
        let report = store.sweep().await;
        assert_eq!(report, SweepReport { marked: 1, evicted: 0, remaining: 1 });

        clock.advance(chrono::Duration::seconds(30));
        let report = store.sweep().await;
        assert_eq!(report, SweepReport { marked: 0, evicted: 1, remaining: 0 });

        assert_eq!(store.lookup("abc").await, RecordStatus::NotFound);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_register_and_lookup() {
        let (store, _clock) = create_test_store(TTL);

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let value = format!("seed-{}", i);
                store.register(&value, TTL).await.unwrap();
                store.sweep().await;
                store.lookup(&value).await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), RecordStatus::Valid);
        }
        assert_eq!(store.len().await, 32);
    }
}
