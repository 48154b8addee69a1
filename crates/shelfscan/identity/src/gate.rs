//! Session readiness gate.
//!
//! An explicit state object wrapping the [`DeviceIdentityManager`]. Consumers
//! receive it (usually behind an `Arc`) and must see it `Ready` before sending
//! identity-bound requests. Every resolution attempt moves the gate through
//! `Loading` first, then to `Ready` or `Error`.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info};

use crate::identity::DeviceIdentity;
use crate::manager::{DeviceIdentityManager, Resolution};
use crate::{GateError, IdentityResult};

/// Readiness of the device identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Resolution has not completed.
    Loading,
    /// Identity resolved.
    Ready(DeviceIdentity),
    /// Resolution failed with the captured message.
    Error(String),
}

impl SessionState {
    pub fn is_ready(&self) -> bool {
        matches!(self, SessionState::Ready(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    pub fn identity(&self) -> Option<&DeviceIdentity> {
        match self {
            SessionState::Ready(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SessionState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Loading => "loading",
            SessionState::Ready(_) => "ready",
            SessionState::Error(_) => "error",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Error(message) => write!(f, "error: {}", message),
            other => f.write_str(other.label()),
        }
    }
}

/// Readiness state machine over one identity manager.
#[derive(Debug)]
pub struct SessionGate {
    manager: DeviceIdentityManager,
    state: watch::Sender<SessionState>,
    // Held for a whole transition so published states follow pass order.
    transitions: Mutex<()>,
}

impl SessionGate {
    /// New gate in `Loading`. Nothing is resolved until [`Self::initialize`].
    pub fn new(manager: DeviceIdentityManager) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        Self {
            manager,
            state,
            transitions: Mutex::new(()),
        }
    }

    pub fn manager(&self) -> &DeviceIdentityManager {
        &self.manager
    }

    /// Startup resolution: get or create the identity.
    pub fn initialize(&self) -> SessionState {
        info!("Initializing device identity");
        self.transition(|manager| manager.get_or_create())
    }

    /// Re-resolve the identity, passing through `Loading`.
    pub fn refresh(&self) -> SessionState {
        self.transition(|manager| manager.refresh())
    }

    /// Replace the identity with a new one, passing through `Loading`.
    pub fn reset(&self) -> SessionState {
        self.transition(|manager| manager.reset())
    }

    /// Forget the in-memory identity and return to `Loading`. Storage is untouched.
    pub fn teardown(&self) {
        self.state.send_replace(SessionState::Loading);
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.state.borrow().is_ready()
    }

    pub fn identity(&self) -> Option<DeviceIdentity> {
        self.state.borrow().identity().cloned()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error().map(str::to_string)
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Identity if ready, otherwise fail immediately.
    pub fn require_ready(&self) -> Result<DeviceIdentity, GateError> {
        Self::check(&self.state.borrow())
            .unwrap_or_else(|| Err(GateError::NotReady(SessionState::Loading.label().into())))
    }

    /// Wait until the gate leaves `Loading`, bounded by `limit` if given.
    ///
    /// Resolves to the identity on `Ready` and to [`GateError::Failed`] on `Error`.
    pub async fn wait_ready(&self, limit: Option<Duration>) -> Result<DeviceIdentity, GateError> {
        let mut rx = self.state.subscribe();
        let wait = async move {
            loop {
                let outcome = Self::check(&rx.borrow_and_update());
                if let Some(outcome) = outcome {
                    return outcome;
                }
                if rx.changed().await.is_err() {
                    return Err(GateError::NotReady("gate dropped".into()));
                }
            }
        };

        match limit {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .unwrap_or_else(|_| Err(GateError::Timeout(limit.as_millis() as u64))),
            None => wait.await,
        }
    }

    fn check(state: &SessionState) -> Option<Result<DeviceIdentity, GateError>> {
        match state {
            SessionState::Loading => None,
            SessionState::Ready(identity) => Some(Ok(identity.clone())),
            SessionState::Error(message) => Some(Err(GateError::Failed(message.clone()))),
        }
    }

    fn transition<F>(&self, resolve: F) -> SessionState
    where
        F: FnOnce(&DeviceIdentityManager) -> IdentityResult<Resolution>,
    {
        let _transition = self
            .transitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.state.send_replace(SessionState::Loading);

        let next = match resolve(&self.manager) {
            Ok(resolution) => {
                info!(
                    device_id = %resolution.identity.short(),
                    created = resolution.created,
                    persistence = ?resolution.persistence,
                    "Device identity ready"
                );
                SessionState::Ready(resolution.identity)
            }
            Err(e) => {
                error!(error = %e, "Failed to initialize device identity");
                SessionState::Error(e.to_string())
            }
        };

        self.state.send_replace(next.clone());
        next
    }
}
