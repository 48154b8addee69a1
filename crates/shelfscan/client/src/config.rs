//! Client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backend address used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend base URL
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// How long an identity-bound call waits for the gate.
    ///
    /// `None` fails fast when the gate is not ready.
    pub ready_wait_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            ready_wait_ms: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn ready_wait(&self) -> Option<Duration> {
        self.ready_wait_ms.map(Duration::from_millis)
    }
}
