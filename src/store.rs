//! [`KeyValueStore`] backends.
//!
//! * [`MemoryStore`] keeps everything in process memory.  Used by tests and
//!   by shells that bring their own persistence.
//! * [`JsonFileStore`] persists every namespace into a single JSON file:
//!
//! ```json
//! { "SpaceNames": { "123": "Mail", "456": "Chat" } }
//! ```
//!
//! The file is re-read on every access and rewritten on every mutation, so
//! another process editing the same file is picked up on the next read and
//! the last writer wins.

use crate::traits::KeyValueStore;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::path::{Path, PathBuf};

type Namespaces = BTreeMap<String, BTreeMap<String, String>>;

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Namespaces,
}

impl KeyValueStore for MemoryStore {
    type Error = Infallible;

    fn load(&self, namespace: &str, key: &str) -> Result<Option<String>, Infallible> {
        Ok(self.inner.get(namespace).and_then(|ns| ns.get(key)).cloned())
    }

    fn store(&mut self, namespace: &str, key: &str, value: &str) -> Result<(), Infallible> {
        self.inner
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), Infallible> {
        if let Some(ns) = self.inner.get_mut(namespace) {
            ns.remove(key);
        }
        Ok(())
    }

    fn clear(&mut self, namespace: &str) -> Result<(), Infallible> {
        self.inner.remove(namespace);
        Ok(())
    }
}

/// Errors produced by [`JsonFileStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Store backed by one JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store at `path`.  The file is created on the first write;
    /// a missing file reads as empty.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The filesystem path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Namespaces, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Namespaces::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if contents.trim().is_empty() {
            return Ok(Namespaces::new());
        }
        serde_json::from_str(&contents).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, data: &Namespaces) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let json = serde_json::to_string_pretty(data).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        // Write to a sibling and rename so readers never see a torn file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl KeyValueStore for JsonFileStore {
    type Error = StoreError;

    fn load(&self, namespace: &str, key: &str) -> Result<Option<String>, StoreError> {
        let data = self.read_all()?;
        Ok(data.get(namespace).and_then(|ns| ns.get(key)).cloned())
    }

    fn store(&mut self, namespace: &str, key: &str, value: &str) -> Result<(), StoreError> {
        let mut data = self.read_all()?;
        data.entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        self.write_all(&data)
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StoreError> {
        let mut data = self.read_all()?;
        let removed = data
            .get_mut(namespace)
            .and_then(|ns| ns.remove(key))
            .is_some();
        if removed {
            self.write_all(&data)?;
        }
        Ok(())
    }

    fn clear(&mut self, namespace: &str) -> Result<(), StoreError> {
        let mut data = self.read_all()?;
        if data.remove(namespace).is_some() {
            self.write_all(&data)?;
        }
        Ok(())
    }
}
