//! # Key-Value Store Abstraction
//!
//! Document collections sit on an ordered string-keyed store.  A [`KvBackend`] opens a
//! [`KvHandle`] on one collection directory; the handle serves point reads, writes,
//! deletes and ordered prefix scans until it is closed.  Handles are short lived: the
//! document layer opens one per logical operation and closes it before returning.
//!
//! Two backends ship with the crate:
//!
//! - [`MemoryBackend`]: every location is a `BTreeMap` kept behind a shared `Mutex`
//! - [`crate::JsonlBackend`]: an append-only JSON-lines log per collection directory
//!
//! ```rust
//! use std::path::Path;
//! use worldkeeper::{KvBackend, KvHandle, MemoryBackend};
//! use serde_json::json;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let backend = MemoryBackend::new();
//! let mut handle = backend.open(Path::new("/worlds/w/data/actors")).await.unwrap();
//! handle.put("!actors!b", &json!({"name": "B"})).await.unwrap();
//! handle.put("!actors!a", &json!({"name": "A"})).await.unwrap();
//!
//! let keys: Vec<String> = handle
//!     .scan_prefix("!actors!")
//!     .await
//!     .unwrap()
//!     .into_iter()
//!     .map(|(k, _)| k)
//!     .collect();
//! assert_eq!(keys, vec!["!actors!a", "!actors!b"]);
//! handle.close().await.unwrap();
//! # });
//! ```

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use crate::StoreError;

/// Opens store handles on collection locations.
pub trait KvBackend: Send + Sync {
    /// The handle type this backend produces.
    type Handle: KvHandle;

    /// Opens the store rooted at `location`.
    fn open(&self, location: &Path) -> impl Future<Output = Result<Self::Handle, StoreError>> + Send;
}

/// An open store.  Keys are ordered lexically by their bytes.
pub trait KvHandle: Send {
    /// Point lookup.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Value>, StoreError>> + Send;

    /// Inserts or replaces the value stored under `key`.
    fn put(
        &mut self,
        key: &str,
        value: &Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removes `key`, returning whether it was present.
    fn del(&mut self, key: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Every entry whose key starts with `prefix`, in key order.
    fn scan_prefix(
        &self,
        prefix: &str,
    ) -> impl Future<Output = Result<Vec<(String, Value)>, StoreError>> + Send;

    /// Releases the handle, flushing whatever the backend buffers.
    fn close(self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

pub(crate) fn scan_ordered(entries: &BTreeMap<String, Value>, prefix: &str) -> Vec<(String, Value)> {
    entries
        .range(prefix.to_string()..)
        .take_while(|(key, _)| key.starts_with(prefix))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

///////////////////////////////////////////// MemoryBackend ////////////////////////////////////////////

type Locations = HashMap<PathBuf, BTreeMap<String, Value>>;

/// A backend that keeps every location in process memory.
///
/// Clones share storage, so a store built on one clone is visible through the others.
/// Writes through a handle are visible immediately; `close` is a no-op.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    locations: Arc<Mutex<Locations>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys stored at `location`.
    pub fn len(&self, location: &Path) -> Result<usize, StoreError> {
        let locations = lock(&self.locations)?;
        Ok(locations.get(location).map_or(0, BTreeMap::len))
    }

    /// Whether `location` holds no keys.
    pub fn is_empty(&self, location: &Path) -> Result<bool, StoreError> {
        Ok(self.len(location)? == 0)
    }
}

fn lock(locations: &Mutex<Locations>) -> Result<MutexGuard<'_, Locations>, StoreError> {
    locations.lock().map_err(|_| StoreError::Corrupt {
        location: "memory".to_string(),
        reason: "lock poisoned by a panicked writer".to_string(),
    })
}

impl KvBackend for MemoryBackend {
    type Handle = MemoryHandle;

    async fn open(&self, location: &Path) -> Result<MemoryHandle, StoreError> {
        lock(&self.locations)?
            .entry(location.to_path_buf())
            .or_default();
        Ok(MemoryHandle {
            locations: Arc::clone(&self.locations),
            location: location.to_path_buf(),
        })
    }
}

/// A handle on one location of a [`MemoryBackend`].
#[derive(Debug)]
pub struct MemoryHandle {
    locations: Arc<Mutex<Locations>>,
    location: PathBuf,
}

impl MemoryHandle {
    fn with_entries<T>(&self, f: impl FnOnce(&mut BTreeMap<String, Value>) -> T) -> Result<T, StoreError> {
        let mut locations = lock(&self.locations)?;
        Ok(f(locations.entry(self.location.clone()).or_default()))
    }
}

impl KvHandle for MemoryHandle {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.with_entries(|entries| entries.get(key).cloned())
    }

    async fn put(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        self.with_entries(|entries| {
            entries.insert(key.to_string(), value.clone());
        })
    }

    async fn del(&mut self, key: &str) -> Result<bool, StoreError> {
        self.with_entries(|entries| entries.remove(key).is_some())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Value)>, StoreError> {
        self.with_entries(|entries| scan_ordered(entries, prefix))
    }

    async fn close(self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn put_get_del() {
        let backend = MemoryBackend::new();
        let mut handle = backend.open(Path::new("/a")).await.unwrap();
        assert_eq!(handle.get("k").await.unwrap(), None);

        handle.put("k", &json!({"x": 1})).await.unwrap();
        assert_eq!(handle.get("k").await.unwrap(), Some(json!({"x": 1})));

        assert!(handle.del("k").await.unwrap());
        assert!(!handle.del("k").await.unwrap());
        assert_eq!(handle.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn locations_are_isolated() {
        let backend = MemoryBackend::new();
        let mut a = backend.open(Path::new("/a")).await.unwrap();
        let b = backend.open(Path::new("/b")).await.unwrap();
        a.put("k", &json!(1)).await.unwrap();
        assert_eq!(b.get("k").await.unwrap(), None);
        assert_eq!(backend.len(Path::new("/a")).unwrap(), 1);
        assert!(backend.is_empty(Path::new("/b")).unwrap());
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let backend = MemoryBackend::new();
        let mut handle = backend.open(Path::new("/a")).await.unwrap();
        handle.put("k", &json!("v")).await.unwrap();
        handle.close().await.unwrap();

        let handle = backend.clone().open(Path::new("/a")).await.unwrap();
        assert_eq!(handle.get("k").await.unwrap(), Some(json!("v")));
    }

    #[tokio::test]
    async fn scan_is_ordered_and_bounded_by_prefix() {
        let backend = MemoryBackend::new();
        let mut handle = backend.open(Path::new("/a")).await.unwrap();
        for key in ["!items!b", "!actors!z", "!actors!a", "!actorsx!a", "!actors!m"] {
            handle.put(key, &json!(key)).await.unwrap();
        }
        let keys: Vec<String> = handle
            .scan_prefix("!actors!")
            .await
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["!actors!a", "!actors!m", "!actors!z"]);
    }
}
