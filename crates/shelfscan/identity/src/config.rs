//! Identity configuration.

use serde::{Deserialize, Serialize};

/// Durable storage key holding the identity.
pub const DEFAULT_DURABLE_KEY: &str = "bookscanner_device_id";

/// Cookie carrying the identity on HTTP requests.
pub const DEFAULT_COOKIE_NAME: &str = "deviceId";

/// One year, in seconds.
pub const DEFAULT_COOKIE_MAX_AGE_SECS: u64 = 365 * 24 * 60 * 60;

/// Configuration for identity storage and resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Key under which the durable copy is stored.
    pub durable_key: String,

    /// Name of the identity cookie.
    pub cookie_name: String,

    /// Cookie lifetime.
    pub cookie_max_age_secs: u64,

    /// Fail resolution when neither backing accepts the identity.
    ///
    /// When false, an unpersisted identity is still handed out for the
    /// lifetime of the process.
    pub require_persistence: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            durable_key: DEFAULT_DURABLE_KEY.to_string(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_max_age_secs: DEFAULT_COOKIE_MAX_AGE_SECS,
            require_persistence: false,
        }
    }
}

impl IdentityConfig {
    pub fn strict() -> Self {
        Self {
            require_persistence: true,
            ..Self::default()
        }
    }
}
