//! # Record Store
//!
//! The persistence seam for Tally.
//!
//! This module defines the `RecordStore` trait: a synchronous key-value
//! store holding named record lists as opaque bytes. Two adapters live here:
//! - `MemoryStore`: volatile, for tests and one-shot sessions
//! - `FileStore`: a single snapshot file rewritten on every write
//!
//! The embedded database adapter is `storage::RedbStore`.

use crate::formats::{records_from_bytes, records_to_bytes};
use crate::TallyError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Raw store contents: key -> encoded record list. Ordered by key.
pub type Entries = BTreeMap<String, Vec<u8>>;

// =============================================================================
// RECORDSTORE TRAIT
// =============================================================================

/// Key-value storage of named record lists.
///
/// All fallible operations return `Result<T, TallyError>` so in-memory and
/// persistent adapters are used uniformly.
pub trait RecordStore {
    /// Read the bytes stored under `key`. `None` when the key was never set.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, TallyError>;

    /// Write several keys. Adapters apply the batch all-or-nothing when the
    /// medium allows it.
    fn set_many(&mut self, entries: Entries) -> Result<(), TallyError>;

    /// Write a single key.
    fn set(&mut self, key: &str, value: Vec<u8>) -> Result<(), TallyError> {
        let mut entries = Entries::new();
        entries.insert(key.to_string(), value);
        self.set_many(entries)
    }

    /// Dump every key in key order.
    fn entries(&self) -> Result<Entries, TallyError>;

    /// Drop all keys and write `entries` in their place.
    fn replace_all(&mut self, entries: Entries) -> Result<(), TallyError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Volatile in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Entries,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, TallyError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_many(&mut self, entries: Entries) -> Result<(), TallyError> {
        self.entries.extend(entries);
        Ok(())
    }

    fn entries(&self) -> Result<Entries, TallyError> {
        Ok(self.entries.clone())
    }

    fn replace_all(&mut self, entries: Entries) -> Result<(), TallyError> {
        self.entries = entries;
        Ok(())
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Snapshot-file store.
///
/// Keeps the entries in memory and rewrites the whole file (header +
/// postcard payload) on every write: write to `<file>.tmp`, then rename.
/// In-memory state changes only after the rename succeeds.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Entries,
}

impl FileStore {
    /// Open a snapshot file, or start empty if it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TallyError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let bytes = std::fs::read(&path)
                .map_err(|e| TallyError::IoError(format!("Read {}: {}", path.display(), e)))?;
            records_from_bytes(&bytes)?
        } else {
            Entries::new()
        };
        Ok(Self { path, entries })
    }

    /// Path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &Entries) -> Result<(), TallyError> {
        let bytes = records_to_bytes(entries)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, &bytes)
            .map_err(|e| TallyError::IoError(format!("Write {}: {}", tmp.display(), e)))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| TallyError::IoError(format!("Replace {}: {}", self.path.display(), e)))
    }
}

impl RecordStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, TallyError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_many(&mut self, entries: Entries) -> Result<(), TallyError> {
        let mut next = self.entries.clone();
        next.extend(entries);
        self.persist(&next)?;
        self.entries = next;
        Ok(())
    }

    fn entries(&self) -> Result<Entries, TallyError> {
        Ok(self.entries.clone())
    }

    fn replace_all(&mut self, entries: Entries) -> Result<(), TallyError> {
        self.persist(&entries)?;
        self.entries = entries;
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
