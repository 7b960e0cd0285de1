//! Injected key-value persistence behind the session store.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("storage quota exceeded: write needs {needed} bytes but the quota is {quota} bytes")]
    QuotaExceeded { needed: u64, quota: u64 },
}

impl StorageError {
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageUsage {
    /// Aggregate byte size of all stored keys.
    pub used_bytes: u64,
    /// `None` for unbounded backends.
    pub quota_bytes: Option<u64>,
}

/// Synchronous key-value persistence. Writes either succeed or fail
/// immediately; a failed write leaves the previous value in place.
pub trait StorageBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
    fn usage(&self) -> Result<StorageUsage, StorageError>;
}

fn check_quota(
    other_bytes: u64,
    value_bytes: u64,
    quota_bytes: Option<u64>,
) -> Result<(), StorageError> {
    let needed = other_bytes + value_bytes;
    match quota_bytes {
        Some(quota) if needed > quota => Err(StorageError::QuotaExceeded { needed, quota }),
        _ => Ok(()),
    }
}

/// One `<key>.json` file per key under a root directory.
pub struct FileStorage {
    root: PathBuf,
    quota_bytes: Option<u64>,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        Self::create(root.into(), None)
    }

    pub fn with_quota(root: impl Into<PathBuf>, quota_bytes: u64) -> Result<Self, StorageError> {
        Self::create(root.into(), Some(quota_bytes))
    }

    fn create(root: PathBuf, quota_bytes: Option<u64>) -> Result<Self, StorageError> {
        fs::create_dir_all(&root)
            .map_err(|source| StorageError::io("creating storage root", &root, source))?;

        Ok(Self { root, quota_bytes })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    fn used_bytes_excluding(&self, skip: Option<&Path>) -> Result<u64, StorageError> {
        let entries = fs::read_dir(&self.root)
            .map_err(|source| StorageError::io("listing storage root", &self.root, source))?;

        let mut used = 0;
        for entry in entries {
            let entry = entry
                .map_err(|source| StorageError::io("listing storage root", &self.root, source))?;
            let path = entry.path();
            if skip == Some(path.as_path()) {
                continue;
            }
            if path.extension().map_or(false, |extension| extension == "json") {
                let metadata = fs::metadata(&path)
                    .map_err(|source| StorageError::io("inspecting stored key", &path, source))?;
                used += metadata.len();
            }
        }

        Ok(used)
    }
}

impl StorageBackend for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::io("reading stored key", &path, source)),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_path(key);
        let other_bytes = self.used_bytes_excluding(Some(path.as_path()))?;
        check_quota(other_bytes, value.len() as u64, self.quota_bytes)?;

        fs::write(&path, value)
            .map_err(|source| StorageError::io("writing stored key", &path, source))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.key_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::io("removing stored key", &path, source)),
        }
    }

    fn usage(&self) -> Result<StorageUsage, StorageError> {
        Ok(StorageUsage {
            used_bytes: self.used_bytes_excluding(None)?,
            quota_bytes: self.quota_bytes,
        })
    }
}

/// HashMap-backed storage; the injectable test double and quota simulator.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
    quota_bytes: Option<u64>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            values: HashMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn used_bytes_excluding(&self, skip: Option<&str>) -> u64 {
        self.values
            .iter()
            .filter(|(key, _)| skip != Some(key.as_str()))
            .map(|(_, value)| value.len() as u64)
            .sum()
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let other_bytes = self.used_bytes_excluding(Some(key));
        check_quota(other_bytes, value.len() as u64, self.quota_bytes)?;

        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }

    fn usage(&self) -> Result<StorageUsage, StorageError> {
        Ok(StorageUsage {
            used_bytes: self.used_bytes_excluding(None),
            quota_bytes: self.quota_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryStorage, StorageBackend, StorageError};

    #[test]
    fn memory_write_over_quota_keeps_previous_value() {
        let mut storage = MemoryStorage::with_quota(8);
        storage
            .write("slot", "small")
            .expect("value under quota should write");

        let error = storage
            .write("slot", "far too large for the slot")
            .expect_err("value over quota must fail");
        assert!(matches!(error, StorageError::QuotaExceeded { .. }));

        let kept = storage
            .read("slot")
            .expect("read should succeed")
            .expect("previous value should remain");
        assert_eq!(kept, "small");
    }

    #[test]
    fn replacing_a_key_only_counts_the_new_value() {
        let mut storage = MemoryStorage::with_quota(10);
        storage
            .write("slot", "0123456789")
            .expect("exact-quota value should write");
        storage
            .write("slot", "9876543210")
            .expect("same-size replacement should write");
    }
}
