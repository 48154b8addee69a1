use crate::cookie::Cookie;
use crate::StorageResult;

/// Durable string key/value storage scoped to one profile.
pub trait DurableStore: Send + Sync {
    /// Read a key. Missing keys are `Ok(None)`.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Cookie storage scoped to one profile and host.
pub trait CookieJar: Send + Sync {
    /// Value of a live cookie. Missing or expired cookies are `Ok(None)`.
    fn get(&self, name: &str) -> StorageResult<Option<String>>;

    /// Store a cookie. A cookie with `max_age == 0` removes `cookie.name`.
    fn set(&self, cookie: Cookie) -> StorageResult<()>;
}
