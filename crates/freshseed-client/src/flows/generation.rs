//! Seed generation: request a seed, show it, count down to expiry
//!
//! `Loading -> Success | Error`, with `Success` re-published once a second as
//! the countdown runs. At most one countdown is alive per flow, and only the newest
//! generation may install or cancel it.

use super::{StateCell, TaskSlot};
use crate::messages::ErrorMessages;
use crate::qr::{QrEncoder, QrImage};
use crate::repository::SeedRepository;
use crate::usecase;
use freshseed_core::{Seed, SeedError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Default side length of the rendered QR image
pub const QR_IMAGE_SIZE: u32 = 500;

/// Countdown tick
pub const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(1);

/// What the generating device shows
#[derive(Debug, Clone)]
pub enum GenerationState {
    Loading,
    Success {
        seed: String,
        image: Arc<QrImage>,
        expires_in_seconds: u32,
    },
    Error {
        message: String,
    },
}

impl GenerationState {
    /// Remaining seconds when showing a seed
    pub fn expires_in_seconds(&self) -> Option<u32> {
        match self {
            GenerationState::Success {
                expires_in_seconds, ..
            } => Some(*expires_in_seconds),
            _ => None,
        }
    }
}

/// Collaborators and state shared with the flow's tasks
struct Shared {
    repository: Arc<dyn SeedRepository>,
    encoder: Arc<dyn QrEncoder>,
    messages: Arc<dyn ErrorMessages>,
    qr_size: u32,
    state: Arc<StateCell<GenerationState>>,
    countdown: Arc<TaskSlot>,
}

/// Drives one generate-and-display interaction
pub struct GenerationFlow {
    shared: Arc<Shared>,
    request: TaskSlot,
}

impl GenerationFlow {
    pub fn new(
        repository: Arc<dyn SeedRepository>,
        encoder: Arc<dyn QrEncoder>,
        messages: Arc<dyn ErrorMessages>,
    ) -> Self {
        Self::with_qr_size(repository, encoder, messages, QR_IMAGE_SIZE)
    }

    pub fn with_qr_size(
        repository: Arc<dyn SeedRepository>,
        encoder: Arc<dyn QrEncoder>,
        messages: Arc<dyn ErrorMessages>,
        qr_size: u32,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                repository,
                encoder,
                messages,
                qr_size,
                state: Arc::new(StateCell::new(GenerationState::Loading)),
                countdown: Arc::new(TaskSlot::default()),
            }),
            request: TaskSlot::default(),
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> GenerationState {
        self.shared.state.current()
    }

    /// Every transition from now on, in order
    pub fn subscribe(&self) -> broadcast::Receiver<GenerationState> {
        self.shared.state.subscribe()
    }

    /// Request a new seed, replacing whatever is in flight or on screen
    ///
    /// Must be called from within a tokio runtime.
    pub fn generate(&self) {
        self.request.cancel();
        let epoch = self.shared.state.begin(GenerationState::Loading);
        // Any countdown still held was started under an older epoch
        self.shared.countdown.cancel();

        let shared = self.shared.clone();
        self.request.replace_with(|| {
            tokio::spawn(async move {
                match usecase::generate_seed(shared.repository.as_ref()).await {
                    Ok(seed) => shared.show_seed(epoch, seed),
                    Err(error) => shared.fail(epoch, error),
                }
            })
        });
    }

    /// Whether a countdown task is currently alive
    pub fn has_active_countdown(&self) -> bool {
        self.shared.countdown.is_active()
    }

    /// Cancel the in-flight request and the countdown; idempotent
    pub fn close(&self) {
        self.request.cancel();
        self.shared.countdown.cancel();
    }
}

impl Drop for GenerationFlow {
    fn drop(&mut self) {
        self.close();
    }
}

impl Shared {
    fn show_seed(&self, epoch: u64, seed: Seed) {
        let Some(image) = self.encoder.encode(&seed.value, self.qr_size) else {
            warn!("QR encoding failed, countdown not started");
            self.fail(epoch, SeedError::InvalidQrGeneration);
            return;
        };

        let remaining = seed.seconds_remaining();
        let shown = self.state.set_if(
            epoch,
            GenerationState::Success {
                seed: seed.value,
                image: Arc::new(image),
                expires_in_seconds: remaining,
            },
        );
        if shown {
            self.start_countdown(epoch, remaining);
        }
    }

    fn fail(&self, epoch: u64, error: SeedError) {
        self.state.set_if(
            epoch,
            GenerationState::Error {
                message: self.messages.message(error),
            },
        );
    }

    fn start_countdown(&self, epoch: u64, duration: u32) {
        let started = self.state.run_if(epoch, || {
            if duration == 0 {
                self.countdown.cancel();
                warn!("Countdown not started - seed already expired");
            } else {
                self.spawn_countdown(epoch, duration);
            }
        });
        if started.is_none() {
            debug!("Countdown for a superseded seed dropped");
        }
    }

    fn spawn_countdown(&self, epoch: u64, duration: u32) {
        let state = self.state.clone();
        self.countdown.replace_with(|| {
            tokio::spawn(async move {
                for remaining in (0..duration).rev() {
                    tokio::time::sleep(COUNTDOWN_INTERVAL).await;
                    let ticked = state.update_if(epoch, |current| match current {
                        GenerationState::Success {
                            expires_in_seconds, ..
                        } => {
                            *expires_in_seconds = remaining;
                            true
                        }
                        _ => false,
                    });
                    if !ticked {
                        debug!("Countdown superseded");
                        return;
                    }
                }
                debug!("Countdown finished");
            })
        });
    }
}
