//! In-memory storage backend

use crate::{
    error::{Result, StorageError},
    traits::{BackingReader, RawArray, Source},
};

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;

/// In-memory backing reader.
///
/// Holds arrays keyed by `(source, key)` and counts how often each one is
/// read, which makes it the reference backend for cache tests and small
/// synthetic catalogs.
#[derive(Debug, Default)]
pub struct MemoryReader {
    /// Stored arrays indexed by source and key
    tables: RwLock<HashMap<(Source, String), RawArray>>,
    /// Successful and failed reads per source and key
    reads: Mutex<HashMap<(Source, String), usize>>,
}

impl MemoryReader {
    /// Create a new empty reader
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an array
    pub fn insert(&self, source: Source, key: impl Into<String>, array: RawArray) {
        self.tables.write().insert((source, key.into()), array);
    }

    /// Builder-style [`MemoryReader::insert`]
    pub fn with(self, source: Source, key: impl Into<String>, array: RawArray) -> Self {
        self.insert(source, key, array);
        self
    }

    /// Remove an array, returning it if present
    pub fn remove(&self, source: Source, key: &str) -> Option<RawArray> {
        self.tables.write().remove(&(source, key.to_string()))
    }

    /// Number of read attempts made for one key
    pub fn read_count(&self, source: Source, key: &str) -> usize {
        self.reads
            .lock()
            .get(&(source, key.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Number of read attempts across all keys
    pub fn total_reads(&self) -> usize {
        self.reads.lock().values().sum()
    }

    /// Number of stored arrays
    pub fn len(&self) -> usize {
        self.tables.read().len()
    }

    /// Whether no arrays are stored
    pub fn is_empty(&self) -> bool {
        self.tables.read().is_empty()
    }
}

impl BackingReader for MemoryReader {
    fn read_raw(&self, source: Source, key: &str) -> Result<RawArray> {
        *self
            .reads
            .lock()
            .entry((source, key.to_string()))
            .or_insert(0) += 1;

        self.tables
            .read()
            .get(&(source, key.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::not_found(source, key))
    }

    fn describe(&self) -> String {
        format!("in-memory reader ({} arrays)", self.len())
    }
}
