//! freshseed Client - Talking to the seed server from either device
//!
//! Layers, outermost first:
//!
//! - **Flows**: [`GenerationFlow`] (request a seed, show it as a QR code with a
//!   live countdown) and [`ValidationFlow`] (submit a scanned value, show the
//!   verdict). Both publish every state transition to subscribers.
//! - **Use cases**: narrow repository failures to a [`SeedError`] kind.
//! - **Repository**: [`SeedRepository`] turns wire responses into domain
//!   values and transport failures into typed [`RepositoryError`]s.
//! - **Transport**: [`RetryingClient`] wraps an [`HttpTransport`] with a
//!   bounded retry policy for I/O failures and gateway errors.
//!
//! # Example
//!
//! ```no_run
//! use freshseed_client::{connect, EnglishMessages, ValidationFlow};
//! use freshseed_core::ClientConfig;
//! use std::sync::Arc;
//!
//! async fn example() {
//!     let config = ClientConfig::new().with_server_url("http://192.168.1.10:3000");
//!     let repository = connect(&config);
//!
//!     let flow = ValidationFlow::new(repository, Arc::new(EnglishMessages));
//!     let mut states = flow.subscribe();
//!     flow.on_scanned("3f2a...");
//!     while let Ok(state) = states.recv().await {
//!         println!("{:?}", state);
//!     }
//! }
//! ```
//!
//! [`SeedError`]: freshseed_core::SeedError

pub mod flows;
pub mod messages;
pub mod qr;
pub mod repository;
pub mod retry;
pub mod transport;
pub mod usecase;

#[cfg(test)]
pub(crate) mod testing;

pub use flows::{GenerationFlow, GenerationState, ValidationFlow, ValidationState};
pub use messages::{EnglishMessages, ErrorMessages};
pub use qr::{render_terminal, QrEncoder, QrImage, QrRenderer};
pub use repository::{HttpSeedRepository, RepositoryError, SeedRepository};
pub use retry::{RetryPolicy, RetryingClient};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport, TransportError};

use freshseed_core::ClientConfig;
use std::sync::Arc;

/// Build the production repository stack for a configuration
pub fn connect(config: &ClientConfig) -> Arc<dyn SeedRepository> {
    let transport = HttpTransport::new(config.server_url.clone());
    let client = RetryingClient::new(transport, RetryPolicy::from_config(config));
    Arc::new(HttpSeedRepository::new(client))
}
