//! Async handle for hosts where navigation and authentication events arrive
//! on different tasks.
//!
//! Transitions are serialized by one mutex: at most one runs at a time and
//! later ones wait their turn. Authentication changes arrive on a `watch`
//! channel and are folded in after the transition in progress, never in the
//! middle of one, so a step's submitted output always applies to the step
//! the user saw.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::controller::{FlowController, StepView};
use crate::error::FlowError;
use crate::state::{FlowState, Phase};

struct Inner {
    controller: FlowController,
    auth: watch::Receiver<bool>,
}

impl Inner {
    /// Apply the latest authentication value if the controller disagrees.
    ///
    /// Compares against the controller rather than `has_changed`, which
    /// errors once the sender is gone even if its last value was never seen.
    fn sync_auth(&mut self) -> Result<(), FlowError> {
        let value = *self.auth.borrow_and_update();
        if value != self.controller.state().is_authenticated() {
            self.controller.set_authenticated(value)?;
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct SharedFlow {
    inner: Arc<Mutex<Inner>>,
    auth: watch::Receiver<bool>,
}

impl SharedFlow {
    /// The receiver's current value is applied immediately.
    pub fn new(
        mut controller: FlowController,
        mut auth: watch::Receiver<bool>,
    ) -> Result<Self, FlowError> {
        let is_authenticated = *auth.borrow_and_update();
        controller.set_authenticated(is_authenticated)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                controller,
                auth: auth.clone(),
            })),
            auth,
        })
    }

    pub async fn start(&self) -> Result<Phase, FlowError> {
        let mut inner = self.inner.lock().await;
        inner.sync_auth()?;
        inner.controller.start()
    }

    pub async fn submit_step(&self, delta: Map<String, Value>) -> Result<Phase, FlowError> {
        let mut inner = self.inner.lock().await;
        let phase = inner.controller.submit_step(delta)?;
        if phase == Phase::Complete {
            return Ok(phase);
        }
        inner.sync_auth()?;
        Ok(inner.controller.phase())
    }

    pub async fn go_back(&self) -> Result<Phase, FlowError> {
        let mut inner = self.inner.lock().await;
        inner.controller.go_back()?;
        inner.sync_auth()?;
        Ok(inner.controller.phase())
    }

    /// Fold in an authentication change. Waits for any transition in
    /// progress; if that transition already applied the change this is a
    /// no-op.
    pub async fn notify_auth_changed(&self) -> Result<Phase, FlowError> {
        let mut inner = self.inner.lock().await;
        inner.sync_auth()?;
        Ok(inner.controller.phase())
    }

    /// Spawn a task that calls [`Self::notify_auth_changed`] for every
    /// change on the channel. Ends when the sender is dropped.
    pub fn spawn_auth_listener(&self) -> JoinHandle<()> {
        let flow = self.clone();
        let mut auth = self.auth.clone();
        tokio::spawn(async move {
            while auth.changed().await.is_ok() {
                if let Err(e) = flow.notify_auth_changed().await {
                    tracing::error!(error = %e, "failed to apply authentication change");
                }
            }
        })
    }

    pub async fn current_step(&self) -> Option<StepView> {
        self.inner.lock().await.controller.current_step()
    }

    pub async fn phase(&self) -> Phase {
        self.inner.lock().await.controller.phase()
    }

    /// A copy of the accumulated state.
    pub async fn snapshot(&self) -> FlowState {
        self.inner.lock().await.controller.state().clone()
    }
}
