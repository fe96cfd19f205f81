//! Client state machines
//!
//! Each flow owns a [`StateCell`]: the current state plus a broadcast of
//! every transition in the order it happened. A cell also carries an epoch
//! that is bumped whenever the flow restarts, so a task started for an older
//! request can never overwrite state produced by a newer one.

pub mod generation;
pub mod validation;

pub use generation::{GenerationFlow, GenerationState};
pub use validation::{ValidationFlow, ValidationState};

use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Transitions buffered per subscriber before it starts lagging
const STATE_CHANNEL_CAPACITY: usize = 64;

struct Versioned<S> {
    epoch: u64,
    state: S,
}

/// Observable, epoch-guarded state holder
pub(crate) struct StateCell<S> {
    inner: Mutex<Versioned<S>>,
    tx: broadcast::Sender<S>,
}

impl<S: Clone> StateCell<S> {
    pub(crate) fn new(initial: S) -> Self {
        let (tx, _) = broadcast::channel(STATE_CHANNEL_CAPACITY);
        Self {
            inner: Mutex::new(Versioned {
                epoch: 0,
                state: initial,
            }),
            tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Versioned<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn current(&self) -> S {
        self.lock().state.clone()
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<S> {
        self.tx.subscribe()
    }

    /// Start a new epoch with `state`, invalidating all older writers
    pub(crate) fn begin(&self, state: S) -> u64 {
        let mut inner = self.lock();
        inner.epoch += 1;
        inner.state = state.clone();
        let _ = self.tx.send(state);
        inner.epoch
    }

    /// Replace the state if `epoch` is still current
    pub(crate) fn set_if(&self, epoch: u64, state: S) -> bool {
        self.update_if(epoch, |current| {
            *current = state;
            true
        })
    }

    /// Edit the state in place if `epoch` is still current and `edit` accepts
    pub(crate) fn update_if(&self, epoch: u64, edit: impl FnOnce(&mut S) -> bool) -> bool {
        let mut inner = self.lock();
        if inner.epoch != epoch || !edit(&mut inner.state) {
            return false;
        }
        let _ = self.tx.send(inner.state.clone());
        true
    }

    /// Run `action` while `epoch` is held as the current one
    ///
    /// No `begin` can interleave with `action`, so whatever it does is
    /// either ordered before the next epoch or not done at all.
    pub(crate) fn run_if<R>(&self, epoch: u64, action: impl FnOnce() -> R) -> Option<R> {
        let inner = self.lock();
        (inner.epoch == epoch).then(action)
    }
}

/// Slot holding at most one cancellable task
#[derive(Default)]
pub(crate) struct TaskSlot {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TaskSlot {
    fn lock(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Abort the held task, if any; safe to call repeatedly
    pub(crate) fn cancel(&self) {
        if let Some(handle) = self.lock().take() {
            handle.abort();
        }
    }

    /// Abort the held task and hold `spawn()`'s task instead
    pub(crate) fn replace_with(&self, spawn: impl FnOnce() -> JoinHandle<()>) {
        let mut slot = self.lock();
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        *slot = Some(spawn());
    }

    pub(crate) fn is_active(&self) -> bool {
        self.lock().as_ref().is_some_and(|h| !h.is_finished())
    }
}
