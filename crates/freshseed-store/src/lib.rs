//! freshseed Store - Seed registry and lifecycle
//!
//! Holds every outstanding seed in process memory together with its expiry,
//! and implements the issuance and validation semantics served over HTTP.
//!
//! # Lifecycle
//!
//! 1. `SeedService::issue()` generates a random 32-character hex seed and
//!    registers it with a fixed time-to-live
//! 2. `SeedService::validate()` classifies any string as valid, expired or
//!    not found; validation never consumes a seed
//! 3. A [`Sweeper`] periodically marks expired records and evicts those past
//!    their grace window
//!
//! # Example
//!
//! ```no_run
//! use freshseed_store::{SeedService, SeedStore, Sweeper, SystemClock};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! async fn example() {
//!     let store = Arc::new(SeedStore::new(Arc::new(SystemClock), Duration::from_secs(300)));
//!     let _sweeper = Sweeper::spawn(store.clone(), Duration::from_secs(60));
//!     let service = SeedService::new(store, Duration::from_secs(300));
//!
//!     let issued = service.issue().await.unwrap();
//!     let outcome = service.validate(&issued.seed).await;
//!     assert!(outcome.valid);
//! }
//! ```

pub mod clock;
pub mod service;
pub mod store;
pub mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use service::{generate_seed_value, SeedService, SEED_BYTES};
pub use store::{RecordStatus, SeedStore, StoreError, StoreResult, SweepReport};
pub use sweeper::{Sweeper, MIN_SWEEP_INTERVAL};
