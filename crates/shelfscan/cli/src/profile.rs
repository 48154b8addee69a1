//! Local profile: the directory holding this device's identity backings.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use shelfscan_identity::{
    DeviceIdentity, DeviceIdentityManager, FileCookieJar, FileDurableStore, IdentityConfig,
    SessionGate, SessionState,
};

use crate::error::{CliError, CliResult};

/// Identity backings and readiness gate for one data directory
pub struct Profile {
    dir: PathBuf,
    gate: Arc<SessionGate>,
}

impl Profile {
    /// Open the profile in `dir`. Nothing is read until [`Profile::start`].
    pub fn open(dir: impl Into<PathBuf>, config: IdentityConfig) -> Self {
        let dir = dir.into();
        let manager = DeviceIdentityManager::with_backings(
            Arc::new(FileDurableStore::in_dir(&dir)),
            Arc::new(FileCookieJar::in_dir(&dir)),
            config,
        );
        Self {
            dir,
            gate: Arc::new(SessionGate::new(manager)),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn gate(&self) -> &Arc<SessionGate> {
        &self.gate
    }

    /// Run startup resolution and require the gate to be ready.
    pub fn start(&self) -> CliResult<DeviceIdentity> {
        settle(self.gate.initialize())
    }
}

/// Map a post-resolution gate state to the identity or an initialization error.
pub fn settle(state: SessionState) -> CliResult<DeviceIdentity> {
    match state {
        SessionState::Ready(identity) => Ok(identity),
        SessionState::Error(message) => Err(CliError::Initialization(message)),
        SessionState::Loading => Err(CliError::Initialization(
            "device identity is still loading".into(),
        )),
    }
}
