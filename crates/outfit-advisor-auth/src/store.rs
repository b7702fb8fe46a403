//! Client-side key/value storage and cookie jar.
//!
//! Mirrors the browser's local storage and cookie semantics closely enough
//! for the session gate: cookies carry an absolute expiry and an expired
//! cookie reads as absent.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One stored cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    /// Cookie value.
    pub value: String,
    /// Cookie path attribute.
    pub path: String,
    /// Absolute epoch milliseconds after which the cookie is gone.
    pub expires_at_ms: u64,
}

impl StoredCookie {
    /// Returns `true` when the cookie is still readable at `now_ms`.
    pub fn is_live(&self, now_ms: u64) -> bool {
        now_ms < self.expires_at_ms && !self.value.is_empty()
    }
}

/// Serializable view of everything a [`ClientStore`] holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientStorageSnapshot {
    /// Local-storage items.
    #[serde(default)]
    pub local_storage: BTreeMap<String, String>,
    /// Cookies keyed by name.
    #[serde(default)]
    pub cookies: BTreeMap<String, StoredCookie>,
}

/// Client storage abstraction (local storage plus cookie jar).
pub trait ClientStore: Send {
    /// Reads a local-storage item.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Writes a local-storage item.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes a local-storage item.
    fn remove_item(&mut self, key: &str) -> Result<(), StoreError>;

    /// Reads a cookie regardless of expiry.
    fn cookie(&self, name: &str) -> Option<StoredCookie>;

    /// Writes a cookie.
    fn set_cookie(&mut self, name: &str, cookie: StoredCookie) -> Result<(), StoreError>;
}

/// Returns the cookie value when present and unexpired at `now_ms`.
pub fn live_cookie(store: &dyn ClientStore, name: &str, now_ms: u64) -> Option<String> {
    store
        .cookie(name)
        .filter(|cookie| cookie.is_live(now_ms))
        .map(|cookie| cookie.value)
}

/// Volatile store, used by tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryClientStore {
    snapshot: ClientStorageSnapshot,
}

impl MemoryClientStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current contents.
    pub fn snapshot(&self) -> ClientStorageSnapshot {
        self.snapshot.clone()
    }
}

impl ClientStore for MemoryClientStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.snapshot.local_storage.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.snapshot
            .local_storage
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        self.snapshot.local_storage.remove(key);
        Ok(())
    }

    fn cookie(&self, name: &str) -> Option<StoredCookie> {
        self.snapshot.cookies.get(name).cloned()
    }

    fn set_cookie(&mut self, name: &str, cookie: StoredCookie) -> Result<(), StoreError> {
        self.snapshot.cookies.insert(name.to_string(), cookie);
        Ok(())
    }
}

/// JSON-file store that survives restarts. Every mutation is flushed.
#[derive(Debug, Clone)]
pub struct FileClientStore {
    path: PathBuf,
    snapshot: ClientStorageSnapshot,
}

impl FileClientStore {
    /// Opens `path`, starting empty when the file does not exist.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] for unreadable files and
    /// [`StoreError::Codec`] for corrupt content.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let snapshot = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(StoreError::Codec)?,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                ClientStorageSnapshot::default()
            }
            Err(error) => return Err(StoreError::Io(error)),
        };
        Ok(Self { path, snapshot })
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.snapshot).map_err(StoreError::Codec)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl ClientStore for FileClientStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.snapshot.local_storage.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.snapshot
            .local_storage
            .insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        self.snapshot.local_storage.remove(key);
        self.flush()
    }

    fn cookie(&self, name: &str) -> Option<StoredCookie> {
        self.snapshot.cookies.get(name).cloned()
    }

    fn set_cookie(&mut self, name: &str, cookie: StoredCookie) -> Result<(), StoreError> {
        self.snapshot.cookies.insert(name.to_string(), cookie);
        self.flush()
    }
}

/// Client storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing file could not be read or written.
    #[error("storage io failure: {0}")]
    Io(#[from] std::io::Error),
    /// Backing file content is not valid JSON.
    #[error("storage codec failure: {0}")]
    Codec(serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("nested").join("storage.json");

        let mut store = FileClientStore::open(&path).expect("store should open");
        store.set_item("has_uploaded", "true").expect("write");
        store
            .set_cookie(
                "access_token",
                StoredCookie {
                    value: "tok".to_string(),
                    path: "/".to_string(),
                    expires_at_ms: 10,
                },
            )
            .expect("cookie write");

        let reopened = FileClientStore::open(&path).expect("store should reopen");
        assert_eq!(reopened.get_item("has_uploaded").as_deref(), Some("true"));
        assert_eq!(live_cookie(&reopened, "access_token", 9).as_deref(), Some("tok"));
        assert!(live_cookie(&reopened, "access_token", 10).is_none());
    }
}
