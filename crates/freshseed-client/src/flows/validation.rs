//! Seed validation: scanned value in, verdict out
//!
//! `Scan -> Loading -> Success | Error`. A terminal state stays on screen
//! until the next scan arrives.

use super::{StateCell, TaskSlot};
use crate::messages::ErrorMessages;
use crate::repository::SeedRepository;
use crate::usecase;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// What the scanning device shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationState {
    Scan,
    Loading,
    Success { valid: bool },
    Error { message: String },
}

/// Drives scan-to-verdict interactions
pub struct ValidationFlow {
    repository: Arc<dyn SeedRepository>,
    messages: Arc<dyn ErrorMessages>,
    state: Arc<StateCell<ValidationState>>,
    request: TaskSlot,
}

impl ValidationFlow {
    pub fn new(repository: Arc<dyn SeedRepository>, messages: Arc<dyn ErrorMessages>) -> Self {
        Self {
            repository,
            messages,
            state: Arc::new(StateCell::new(ValidationState::Scan)),
            request: TaskSlot::default(),
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> ValidationState {
        self.state.current()
    }

    /// Every transition from now on, in order
    pub fn subscribe(&self) -> broadcast::Receiver<ValidationState> {
        self.state.subscribe()
    }

    /// Submit a value decoded from a scanned code
    ///
    /// An empty value (nothing decoded) is ignored; anything else is sent to
    /// the server as-is. Must be called from within a tokio runtime.
    pub fn on_scanned(&self, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            debug!("Ignoring empty scan");
            return;
        }

        self.request.cancel();
        let epoch = self.state.begin(ValidationState::Loading);

        let repository = self.repository.clone();
        let messages = self.messages.clone();
        let state = self.state.clone();
        self.request.replace_with(|| {
            tokio::spawn(async move {
                let next = match usecase::validate_seed(repository.as_ref(), &value).await {
                    Ok(valid) => ValidationState::Success { valid },
                    Err(error) => ValidationState::Error {
                        message: messages.message(error),
                    },
                };
                state.set_if(epoch, next);
            })
        });
    }

    /// Cancel the in-flight request; idempotent
    pub fn close(&self) {
        self.request.cancel();
    }
}

impl Drop for ValidationFlow {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::EnglishMessages;
    use crate::repository::{HttpSeedRepository, RepositoryError};
    use crate::retry::{RetryPolicy, RetryingClient};
    use crate::testing::{io_error, MockRepository, ScriptedTransport};
    use freshseed_core::SeedError;
    use std::time::Duration;

    async fn next(rx: &mut broadcast::Receiver<ValidationState>) -> ValidationState {
        rx.recv().await.unwrap()
    }

    fn create_flow(repository: Arc<dyn SeedRepository>) -> ValidationFlow {
        ValidationFlow::new(repository, Arc::new(EnglishMessages))
    }

    #[tokio::test(start_paused = true)]
    async fn test_valid_and_invalid_verdicts() {
        let repo = Arc::new(MockRepository::new());
        repo.push_verdict(Ok(true)).push_verdict(Ok(false));
        let flow = create_flow(repo.clone());
        assert_eq!(flow.state(), ValidationState::Scan);

        let mut rx = flow.subscribe();
        flow.on_scanned("abc");
        assert_eq!(next(&mut rx).await, ValidationState::Loading);
        assert_eq!(next(&mut rx).await, ValidationState::Success { valid: true });

        flow.on_scanned("abc");
        assert_eq!(next(&mut rx).await, ValidationState::Loading);
        assert_eq!(next(&mut rx).await, ValidationState::Success { valid: false });
        assert_eq!(repo.validate_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connectivity_failure_after_retries() {
        let transport = ScriptedTransport::new(vec![Err(io_error()), Err(io_error())]);
        let repo = Arc::new(HttpSeedRepository::new(RetryingClient::new(
            transport,
            RetryPolicy::default(),
        )));
        let flow = create_flow(repo.clone());

        let mut rx = flow.subscribe();
        flow.on_scanned("abc");

        assert_eq!(next(&mut rx).await, ValidationState::Loading);
        assert_eq!(
            next(&mut rx).await,
            ValidationState::Error {
                message: EnglishMessages.message(SeedError::NoInternetConnection)
            }
        );
        assert_eq!(repo.transport().inner().calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_failure_message() {
        let repo = Arc::new(MockRepository::new());
        repo.push_verdict(Err(RepositoryError::Server { status: 500 }));
        let flow = create_flow(repo);

        let mut rx = flow.subscribe();
        flow.on_scanned("abc");

        assert_eq!(next(&mut rx).await, ValidationState::Loading);
        assert_eq!(
            next(&mut rx).await,
            ValidationState::Error {
                message: EnglishMessages.message(SeedError::ServerError)
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_verdict_stays_until_next_scan() {
        let repo = Arc::new(MockRepository::new());
        repo.push_verdict(Ok(true));
        let flow = create_flow(repo);

        let mut rx = flow.subscribe();
        flow.on_scanned("abc");
        next(&mut rx).await;
        next(&mut rx).await;

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(flow.state(), ValidationState::Success { valid: true });
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_scan_ignored() {
        let repo = Arc::new(MockRepository::new());
        let flow = create_flow(repo.clone());

        flow.on_scanned("");

        assert_eq!(flow.state(), ValidationState::Scan);
        assert_eq!(repo.validate_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_whitespace_scan_is_classified() {
        let repo = Arc::new(MockRepository::new());
        repo.push_verdict(Ok(false));
        let flow = create_flow(repo.clone());

        let mut rx = flow.subscribe();
        flow.on_scanned("   ");

        assert_eq!(next(&mut rx).await, ValidationState::Loading);
        assert_eq!(next(&mut rx).await, ValidationState::Success { valid: false });
        assert_eq!(repo.validate_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rescan_supersedes_slow_verdict() {
        let repo = Arc::new(MockRepository::new());
        repo.push_verdict_after(Duration::from_secs(3), Ok(true))
            .push_verdict(Ok(false));
        let flow = create_flow(repo.clone());

        let mut rx = flow.subscribe();
        flow.on_scanned("first");
        assert_eq!(next(&mut rx).await, ValidationState::Loading);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(repo.validate_calls(), 1);

        flow.on_scanned("second");
        assert_eq!(next(&mut rx).await, ValidationState::Loading);
        assert_eq!(next(&mut rx).await, ValidationState::Success { valid: false });

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(flow.state(), ValidationState::Success { valid: false });
        assert!(rx.try_recv().is_err());
        assert_eq!(repo.validate_calls(), 2);
    }
}
