//! Storage backings for the device identity.
//!
//! Two independent backings hold a copy of the identity:
//! - [`DurableStore`]: string key/value storage surviving restarts
//! - [`CookieJar`]: the cookie sent along with HTTP requests
//!
//! Each backing comes with an in-memory implementation (tests, embedding) and a
//! file-backed implementation rooted in a profile directory.

mod file;
mod memory;
mod traits;

pub use file::{FileCookieJar, FileDurableStore};
pub use memory::{MemoryCookieJar, MemoryDurableStore};
pub use traits::{CookieJar, DurableStore};
