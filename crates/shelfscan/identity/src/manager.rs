//! Device identity manager: get-or-create, refresh and reset.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};

use crate::adapter::{IdentitySource, IdentityStore, WriteReport};
use crate::config::IdentityConfig;
use crate::generator::IdentityGenerator;
use crate::identity::DeviceIdentity;
use crate::storage::{CookieJar, DurableStore};
use crate::{IdentityError, IdentityResult};

/// Where a resolved identity ended up being stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// Both backings hold the identity.
    Full,
    DurableOnly,
    CookieOnly,
    /// Neither backing accepted it; the identity lives only in this process.
    Transient,
}

impl Persistence {
    fn from_report(report: &WriteReport) -> Self {
        match (report.durable_error.is_none(), report.cookie_error.is_none()) {
            (true, true) => Persistence::Full,
            (true, false) => Persistence::DurableOnly,
            (false, true) => Persistence::CookieOnly,
            (false, false) => Persistence::Transient,
        }
    }

    /// Whether the identity will survive a restart.
    pub fn is_durable(self) -> bool {
        self != Persistence::Transient
    }
}

/// Result of one resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub identity: DeviceIdentity,
    /// Whether the identity was freshly generated in this pass.
    pub created: bool,
    /// Backing the identity was recovered from, `None` when generated.
    pub source: Option<IdentitySource>,
    pub persistence: Persistence,
}

/// Sole writer of the identity key.
///
/// Resolution passes are serialized: a pass reads, decides and writes while
/// holding `resolving`, so a refresh can never write back a value that a
/// concurrent reset already replaced. Clones share the lock.
#[derive(Debug, Clone)]
pub struct DeviceIdentityManager {
    store: IdentityStore,
    generator: IdentityGenerator,
    resolving: Arc<Mutex<()>>,
}

impl DeviceIdentityManager {
    pub fn new(store: IdentityStore, generator: IdentityGenerator) -> Self {
        Self {
            store,
            generator,
            resolving: Arc::new(Mutex::new(())),
        }
    }

    /// Manager over the given backings with the OS-backed generator.
    pub fn with_backings(
        durable: Arc<dyn DurableStore>,
        cookies: Arc<dyn CookieJar>,
        config: IdentityConfig,
    ) -> Self {
        Self::new(
            IdentityStore::new(durable, cookies, config),
            IdentityGenerator::new(),
        )
    }

    pub fn store(&self) -> &IdentityStore {
        &self.store
    }

    pub fn config(&self) -> &IdentityConfig {
        self.store.config()
    }

    /// Return the stored identity, creating one if neither backing has it.
    ///
    /// Both backings are rewritten with the resolved value on every call, which
    /// heals a copy that was lost or diverged.
    pub fn get_or_create(&self) -> IdentityResult<Resolution> {
        let _pass = self.serialized();
        match self.store.reconciled() {
            Some(found) => {
                debug!(
                    device_id = %found.identity.short(),
                    source = ?found.source,
                    in_sync = found.in_sync(),
                    "Using existing device identity"
                );
                let report = self.store.write(&found.identity);
                self.finish(found.identity, false, Some(found.source), report)
            }
            None => {
                let identity = self.generator.generate();
                info!(device_id = %identity.short(), "Generated new device identity");
                let report = self.store.write(&identity);
                self.finish(identity, true, None, report)
            }
        }
    }

    /// Re-resolve the identity. Same semantics as [`Self::get_or_create`].
    pub fn refresh(&self) -> IdentityResult<Resolution> {
        debug!("Refreshing device identity");
        self.get_or_create()
    }

    /// Discard the current identity and issue a new one.
    ///
    /// Anything the backend keyed by the old identity becomes unreachable from
    /// this profile.
    pub fn reset(&self) -> IdentityResult<Resolution> {
        let _pass = self.serialized();
        let previous = self.store.read();
        info!(
            previous = previous.as_ref().map(|p| p.short()).unwrap_or("none"),
            "Resetting device identity"
        );
        self.store.clear();

        let mut identity = self.generator.generate();
        while Some(&identity) == previous.as_ref() {
            identity = self.generator.generate();
        }
        info!(device_id = %identity.short(), "Issued replacement device identity");

        let report = self.store.write(&identity);
        self.finish(identity, true, None, report)
    }

    /// Stored identity if any. Never generates or writes.
    pub fn current(&self) -> Option<DeviceIdentity> {
        self.store.read()
    }

    /// Whether either backing currently holds an identity.
    pub fn has_identity(&self) -> bool {
        self.store.has_identity()
    }

    fn serialized(&self) -> MutexGuard<'_, ()> {
        self.resolving
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn finish(
        &self,
        identity: DeviceIdentity,
        created: bool,
        source: Option<IdentitySource>,
        report: WriteReport,
    ) -> IdentityResult<Resolution> {
        let persistence = Persistence::from_report(&report);
        match persistence {
            Persistence::Full => {}
            Persistence::Transient if self.config().require_persistence => {
                error!(
                    device_id = %identity.short(),
                    "Device identity could not be stored in any backing"
                );
                return Err(IdentityError::PersistenceUnavailable {
                    durable: report.durable_error.unwrap_or_default(),
                    cookie: report.cookie_error.unwrap_or_default(),
                });
            }
            Persistence::Transient => warn!(
                device_id = %identity.short(),
                "Device identity is not persisted and will not survive a restart"
            ),
            partial => warn!(
                device_id = %identity.short(),
                persistence = ?partial,
                "Device identity persisted in one backing only"
            ),
        }

        Ok(Resolution {
            identity,
            created,
            source,
            persistence,
        })
    }
}
