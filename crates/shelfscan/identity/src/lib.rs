//! Anonymous device identity for the shelfscan client.
//!
//! Every request the client sends to the scanning backend must be attributable
//! to the same "device" across restarts without a login system. This crate
//! provides:
//! - two independent storage backings (durable key/value storage and a cookie)
//! - a store adapter that reconciles them into one canonical value
//! - a UUID v4 generator with a strong source and a pseudo-random fallback
//! - a manager implementing get-or-create, refresh and reset
//! - a readiness gate (`loading -> ready | error`) consumers wait on
//!
//! Design stance:
//! - The durable copy is authoritative; every resolution rewrites both copies.
//! - Storage failures degrade persistence, they never abort resolution unless
//!   [`IdentityConfig::require_persistence`] asks for it.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

mod adapter;
mod config;
mod cookie;
mod error;
mod gate;
mod generator;
mod identity;
mod manager;
pub mod storage;

pub use adapter::{reconcile, IdentitySource, IdentityStore, Reconciled, WriteReport};
pub use config::IdentityConfig;
pub use cookie::{parse_cookie_header, Cookie, SameSite};
pub use error::{GateError, IdentityError, IdentityResult, StorageError, StorageResult};
pub use gate::{SessionGate, SessionState};
pub use generator::{EntropySource, IdentityGenerator, OsEntropy};
pub use identity::DeviceIdentity;
pub use manager::{DeviceIdentityManager, Persistence, Resolution};
pub use storage::{
    CookieJar, DurableStore, FileCookieJar, FileDurableStore, MemoryCookieJar, MemoryDurableStore,
};
