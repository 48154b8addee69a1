//! In-memory backings.
//!
//! Both stores can be switched off at runtime to reproduce a profile where the
//! user disabled storage; every operation then fails with
//! [`StorageError::Unavailable`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::cookie::Cookie;
use crate::storage::{CookieJar, DurableStore};
use crate::{StorageError, StorageResult};

/// In-memory durable store.
#[derive(Debug, Default)]
pub struct MemoryDurableStore {
    entries: Mutex<HashMap<String, String>>,
    disabled: AtomicBool,
}

impl MemoryDurableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate storage being disabled (or re-enabled).
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    fn entries(&self) -> StorageResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        if self.disabled.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("durable storage is disabled".into()));
        }
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("durable storage lock poisoned".into()))
    }
}

impl DurableStore for MemoryDurableStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// In-memory cookie jar. Cookies never age out here; only `max_age == 0` removes.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: Mutex<HashMap<String, Cookie>>,
    disabled: AtomicBool,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    /// Full cookie as last stored, attributes included.
    pub fn cookie(&self, name: &str) -> StorageResult<Option<Cookie>> {
        Ok(self.cookies()?.get(name).cloned())
    }

    fn cookies(&self) -> StorageResult<std::sync::MutexGuard<'_, HashMap<String, Cookie>>> {
        if self.disabled.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("cookies are disabled".into()));
        }
        self.cookies
            .lock()
            .map_err(|_| StorageError::Unavailable("cookie jar lock poisoned".into()))
    }
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> StorageResult<Option<String>> {
        Ok(self
            .cookies()?
            .get(name)
            .map(|cookie| cookie.value.clone())
            .filter(|value| !value.is_empty()))
    }

    fn set(&self, cookie: Cookie) -> StorageResult<()> {
        let mut cookies = self.cookies()?;
        if cookie.is_expired() {
            cookies.remove(&cookie.name);
        } else {
            cookies.insert(cookie.name.clone(), cookie);
        }
        Ok(())
    }
}
