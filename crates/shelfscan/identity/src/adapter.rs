//! Store adapter over the two identity backings.
//!
//! The adapter owns no state. It reads both backings, reconciles them with
//! [`reconcile`], and writes the same value to both. Backing failures are
//! logged and absorbed: a failed read counts as an absent copy, a failed write
//! is reported in [`WriteReport`] but never raised.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::IdentityConfig;
use crate::cookie::Cookie;
use crate::identity::DeviceIdentity;
use crate::storage::{CookieJar, DurableStore};

/// Which backing supplied the canonical value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    Durable,
    Cookie,
}

/// Outcome of reconciling the two copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub identity: DeviceIdentity,
    pub source: IdentitySource,
    /// Whether the durable copy differs from the canonical value.
    pub durable_stale: bool,
    /// Whether the cookie copy differs from the canonical value.
    pub cookie_stale: bool,
}

impl Reconciled {
    pub fn in_sync(&self) -> bool {
        !self.durable_stale && !self.cookie_stale
    }
}

/// Precedence rule: the durable copy wins, the cookie is the fallback.
///
/// Empty strings count as absent in both backings.
pub fn reconcile(durable: Option<&str>, cookie: Option<&str>) -> Option<Reconciled> {
    let durable = durable.filter(|value| !value.is_empty());
    let cookie = cookie.filter(|value| !value.is_empty());

    let (value, source) = match (durable, cookie) {
        (Some(value), _) => (value, IdentitySource::Durable),
        (None, Some(value)) => (value, IdentitySource::Cookie),
        (None, None) => return None,
    };

    Some(Reconciled {
        identity: DeviceIdentity::new(value),
        source,
        durable_stale: durable != Some(value),
        cookie_stale: cookie != Some(value),
    })
}

/// Per-backing result of a write or clear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub durable_error: Option<String>,
    pub cookie_error: Option<String>,
}

impl WriteReport {
    pub fn is_complete(&self) -> bool {
        self.durable_error.is_none() && self.cookie_error.is_none()
    }

    /// At least one backing accepted the operation.
    pub fn persisted_anywhere(&self) -> bool {
        self.durable_error.is_none() || self.cookie_error.is_none()
    }
}

/// Read/write conduit for the identity key in both backings.
#[derive(Clone)]
pub struct IdentityStore {
    durable: Arc<dyn DurableStore>,
    cookies: Arc<dyn CookieJar>,
    config: IdentityConfig,
}

impl std::fmt::Debug for IdentityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityStore")
            .field("durable_key", &self.config.durable_key)
            .field("cookie_name", &self.config.cookie_name)
            .finish()
    }
}

impl IdentityStore {
    pub fn new(
        durable: Arc<dyn DurableStore>,
        cookies: Arc<dyn CookieJar>,
        config: IdentityConfig,
    ) -> Self {
        Self {
            durable,
            cookies,
            config,
        }
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    /// Canonical value, or `None` when neither backing holds one.
    pub fn read(&self) -> Option<DeviceIdentity> {
        self.reconciled().map(|r| r.identity)
    }

    /// Canonical value together with provenance and staleness of each copy.
    pub fn reconciled(&self) -> Option<Reconciled> {
        let durable = self.read_durable();
        let cookie = self.read_cookie();
        reconcile(durable.as_deref(), cookie.as_deref())
    }

    /// Whether either backing currently holds a value.
    pub fn has_identity(&self) -> bool {
        self.reconciled().is_some()
    }

    /// Write `identity` to both backings, attempting each independently.
    pub fn write(&self, identity: &DeviceIdentity) -> WriteReport {
        let durable_error = self
            .durable
            .set(&self.config.durable_key, identity.as_str())
            .err()
            .map(|e| {
                warn!(error = %e, "Failed to write device identity to durable storage");
                e.to_string()
            });

        let cookie = Cookie::identity(
            self.config.cookie_name.clone(),
            identity.as_str(),
            self.config.cookie_max_age_secs,
        );
        let cookie_error = self.cookies.set(cookie).err().map(|e| {
            warn!(error = %e, "Failed to write device identity cookie");
            e.to_string()
        });

        WriteReport {
            durable_error,
            cookie_error,
        }
    }

    /// Remove the durable key and expire the cookie.
    pub fn clear(&self) -> WriteReport {
        let durable_error = self
            .durable
            .remove(&self.config.durable_key)
            .err()
            .map(|e| {
                warn!(error = %e, "Failed to remove device identity from durable storage");
                e.to_string()
            });
        let cookie_error = self
            .cookies
            .set(Cookie::expired(self.config.cookie_name.clone()))
            .err()
            .map(|e| {
                warn!(error = %e, "Failed to expire device identity cookie");
                e.to_string()
            });

        WriteReport {
            durable_error,
            cookie_error,
        }
    }

    fn read_durable(&self) -> Option<String> {
        match self.durable.get(&self.config.durable_key) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "Durable storage unreadable, treating as absent");
                None
            }
        }
    }

    fn read_cookie(&self) -> Option<String> {
        match self.cookies.get(&self.config.cookie_name) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "Cookie jar unreadable, treating as absent");
                None
            }
        }
    }
}
