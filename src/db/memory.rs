use std::collections::HashMap;

use crate::error::TrackerError;
use crate::store::WorkoutStore;

use super::{store_from_blob, Persistence};

/// Key/value storage held in memory. Stands in for SQLite in tests and can be
/// told to fail its writes.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
    key: String,
    fail_saves: bool,
    saves: usize,
}

impl MemoryStorage {
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Start with `blob` already stored under `key`.
    pub fn with_blob<K: Into<String>, B: Into<String>>(key: K, blob: B) -> Self {
        let mut storage = Self::new(key);
        storage.items.insert(storage.key.clone(), blob.into());
        storage
    }

    pub fn fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    pub fn blob(&self) -> Option<&str> {
        self.items.get(&self.key).map(String::as_str)
    }

    /// Number of successful saves so far.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl Persistence for MemoryStorage {
    fn load(&self) -> Result<WorkoutStore, TrackerError> {
        store_from_blob(self.blob().map(str::to_string))
    }

    fn save(&mut self, store: &WorkoutStore) -> Result<(), TrackerError> {
        if self.fail_saves {
            return Err(std::io::Error::other("memory storage is read-only").into());
        }
        let blob = crate::codec::encode(store)?;
        self.items.insert(self.key.clone(), blob);
        self.saves += 1;
        Ok(())
    }
}
