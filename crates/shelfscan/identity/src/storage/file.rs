//! File-backed storage rooted in a profile directory.
//!
//! `storage.json` holds the durable key/value map, `cookies.json` holds cookies
//! with an absolute expiry. Writes go to a temp file that is renamed over the
//! target so a crash never leaves a half-written file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cookie::Cookie;
use crate::storage::{CookieJar, DurableStore};
use crate::{StorageError, StorageResult};

const STORAGE_FILE: &str = "storage.json";
const COOKIE_FILE: &str = "cookies.json";

fn load_map<V: DeserializeOwned>(path: &Path) -> StorageResult<BTreeMap<String, V>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(e.into()),
    };
    if contents.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(&contents)
        .map_err(|e| StorageError::Corrupt(format!("{}: {}", path.display(), e)))
}

/// Map to modify before a write. A corrupt file is discarded so the write
/// replaces it instead of failing forever.
fn load_for_write<V: DeserializeOwned>(path: &Path) -> StorageResult<BTreeMap<String, V>> {
    match load_map(path) {
        Err(StorageError::Corrupt(reason)) => {
            warn!(%reason, "Discarding corrupt storage file");
            Ok(BTreeMap::new())
        }
        other => other,
    }
}

fn save_map<V: Serialize>(path: &Path, map: &BTreeMap<String, V>) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(map)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Durable store persisted as a JSON object of string values.
#[derive(Debug)]
pub struct FileDurableStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileDurableStore {
    /// Store at `<dir>/storage.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::at(dir.as_ref().join(STORAGE_FILE))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update<F>(&self, f: F) -> StorageResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StorageError::Unavailable("durable storage lock poisoned".into()))?;
        let mut map = load_for_write(&self.path)?;
        f(&mut map);
        save_map(&self.path, &map)
    }
}

impl DurableStore for FileDurableStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let map: BTreeMap<String, String> = load_map(&self.path)?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.update(|map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.update(|map| {
            map.remove(key);
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCookie {
    #[serde(flatten)]
    cookie: Cookie,
    expires_at: DateTime<Utc>,
}

impl StoredCookie {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now && !self.cookie.value.is_empty()
    }
}

/// Cookie jar persisted as JSON with absolute expiry timestamps.
#[derive(Debug)]
pub struct FileCookieJar {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCookieJar {
    /// Jar at `<dir>/cookies.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::at(dir.as_ref().join(COOKIE_FILE))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full live cookie, attributes included.
    pub fn cookie(&self, name: &str) -> StorageResult<Option<Cookie>> {
        let map: BTreeMap<String, StoredCookie> = load_map(&self.path)?;
        let now = Utc::now();
        Ok(map
            .get(name)
            .filter(|stored| stored.is_live(now))
            .map(|stored| stored.cookie.clone()))
    }
}

impl CookieJar for FileCookieJar {
    fn get(&self, name: &str) -> StorageResult<Option<String>> {
        Ok(self.cookie(name)?.map(|cookie| cookie.value))
    }

    fn set(&self, cookie: Cookie) -> StorageResult<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StorageError::Unavailable("cookie jar lock poisoned".into()))?;
        let mut map: BTreeMap<String, StoredCookie> = load_for_write(&self.path)?;
        let now = Utc::now();
        map.retain(|_, stored| stored.is_live(now));

        if cookie.is_expired() {
            map.remove(&cookie.name);
        } else {
            let lifetime = i64::try_from(cookie.max_age).unwrap_or(i64::MAX);
            let expires_at = now
                .checked_add_signed(Duration::seconds(lifetime.min(i64::MAX / 1000)))
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            map.insert(cookie.name.clone(), StoredCookie { cookie, expires_at });
        }
        save_map(&self.path, &map)
    }
}
