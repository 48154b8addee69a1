//! The device identity token.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Anonymous identifier of one client profile.
///
/// Values produced by [`crate::IdentityGenerator`] are always UUID v4 strings.
/// Values recovered from storage are kept verbatim: they may come from an older
/// session or from a cookie the backend issued, so they are not re-validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceIdentity(String);

impl DeviceIdentity {
    /// Wrap a value recovered from storage.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid.hyphenated().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// First eight characters, for log lines.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }

    /// Whether the value is a hyphenated UUID with version 4 and RFC 4122 variant.
    pub fn is_uuid_v4(&self) -> bool {
        if self.0.len() != 36 {
            return false;
        }
        match Uuid::try_parse(&self.0) {
            Ok(uuid) => {
                uuid.get_version_num() == 4 && uuid.get_variant() == uuid::Variant::RFC4122
            }
            Err(_) => false,
        }
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DeviceIdentity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for DeviceIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
