//! Durable Storage
//!
//! Key/value persistence that survives process restarts. Only the session
//! store writes here; corrupt or unreadable content is treated as absent
//! data, never as a fatal error.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

// == Storage Trait ==
/// Minimal durable key/value store.
pub trait Storage: Send + Sync {
    /// Returns the stored value, or `None` when the key has never been set.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores a value, overwriting any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

// == File Storage ==
/// One file per key under a root directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Keys map to file names; anything outside `[A-Za-z0-9_-]` is replaced
    /// so a key can never escape the root directory.
    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{name}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Storage(format!("read {key}: {err}"))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root)
            .map_err(|err| StoreError::Storage(format!("create storage dir: {err}")))?;
        fs::write(self.path_for(key), value)
            .map_err(|err| StoreError::Storage(format!("write {key}: {err}")))
    }
}
