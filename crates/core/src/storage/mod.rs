//! Best-effort persistence behind a key-value port.
//!
//! The rest of the library only talks to [`Persistence`], which maps the
//! app's records (last image, selection triangle, dimensions, grid flag)
//! onto string keys of a [`KeyValueStore`]. Stores may be missing or full;
//! `Persistence` decides which failures matter.

mod file;
mod records;

pub use file::FileStore;
pub use records::{ImageRecord, Persistence};

use std::collections::HashMap;

use crate::error::StorageError;

/// A string key-value store with typed failures.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn delete(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Bytes counted against a quota: every key and value.
pub(crate) fn stored_size<'a>(entries: impl Iterator<Item = (&'a String, &'a String)>) -> usize {
    entries.map(|(key, value)| key.len() + value.len()).sum()
}

/// Checks whether replacing `key` with `value` keeps `entries` within `quota`.
pub(crate) fn check_quota(
    entries: &HashMap<String, String>,
    key: &str,
    value: &str,
    quota: Option<usize>,
) -> Result<(), StorageError> {
    let Some(quota) = quota else {
        return Ok(());
    };

    let others = stored_size(entries.iter().filter(|(k, _)| k.as_str() != key));
    let needed = others + key.len() + value.len();
    if needed > quota {
        return Err(StorageError::QuotaExceeded { needed, quota });
    }
    Ok(())
}

/// An in-memory store, optionally bounded by a byte quota.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(quota),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(&self.entries, key, value, self.quota)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}
