//! # redb-backed Record Store
//!
//! A disk-backed record store using the redb embedded database.
//!
//! Every record list lives in a single `records` table keyed by name, so a
//! write batch (list + id counter) commits in one ACID transaction:
//! - Crash safety (copy-on-write B-trees)
//! - Concurrent readers, single writer
//! - Zero configuration

use crate::store::{Entries, RecordStore};
use crate::TallyError;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::{Path, PathBuf};

/// Table for record lists: key -> encoded bytes
const RECORDS: TableDefinition<&str, &[u8]> = TableDefinition::new("records");

/// A disk-backed record store using redb.
pub struct RedbStore {
    db: Database,
    path: PathBuf,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TallyError> {
        let path = path.as_ref().to_path_buf();
        let db = Database::create(&path)
            .map_err(|e| TallyError::IoError(format!("Open {}: {}", path.display(), e)))?;

        // Create the table up front so readers never see it missing
        {
            let write_txn = db
                .begin_write()
                .map_err(|e| TallyError::IoError(e.to_string()))?;
            let _ = write_txn
                .open_table(RECORDS)
                .map_err(|e| TallyError::IoError(e.to_string()))?;
            write_txn
                .commit()
                .map_err(|e| TallyError::IoError(e.to_string()))?;
        }

        Ok(Self { db, path })
    }

    /// Path of the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Compact the database file.
    pub fn compact(&mut self) -> Result<(), TallyError> {
        self.db
            .compact()
            .map_err(|e| TallyError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Write `entries` in one transaction, optionally clearing the table first.
    fn write(&mut self, entries: Entries, clear: bool) -> Result<(), TallyError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| TallyError::IoError(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(RECORDS)
                .map_err(|e| TallyError::IoError(e.to_string()))?;

            if clear {
                let mut stale = Vec::new();
                for entry in table
                    .iter()
                    .map_err(|e| TallyError::IoError(e.to_string()))?
                {
                    let (key, _) = entry.map_err(|e| TallyError::IoError(e.to_string()))?;
                    stale.push(key.value().to_string());
                }
                for key in &stale {
                    table
                        .remove(key.as_str())
                        .map_err(|e| TallyError::IoError(e.to_string()))?;
                }
            }

            for (key, value) in &entries {
                table
                    .insert(key.as_str(), value.as_slice())
                    .map_err(|e| TallyError::IoError(e.to_string()))?;
            }
        }
        write_txn
            .commit()
            .map_err(|e| TallyError::IoError(e.to_string()))?;
        Ok(())
    }
}

impl RecordStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, TallyError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| TallyError::IoError(e.to_string()))?;
        let table = read_txn
            .open_table(RECORDS)
            .map_err(|e| TallyError::IoError(e.to_string()))?;
        Ok(table
            .get(key)
            .map_err(|e| TallyError::IoError(e.to_string()))?
            .map(|v| v.value().to_vec()))
    }

    fn set_many(&mut self, entries: Entries) -> Result<(), TallyError> {
        self.write(entries, false)
    }

    fn entries(&self) -> Result<Entries, TallyError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| TallyError::IoError(e.to_string()))?;
        let table = read_txn
            .open_table(RECORDS)
            .map_err(|e| TallyError::IoError(e.to_string()))?;

        let mut entries = Entries::new();
        for entry in table
            .iter()
            .map_err(|e| TallyError::IoError(e.to_string()))?
        {
            let (key, value) = entry.map_err(|e| TallyError::IoError(e.to_string()))?;
            entries.insert(key.value().to_string(), value.value().to_vec());
        }
        Ok(entries)
    }

    fn replace_all(&mut self, entries: Entries) -> Result<(), TallyError> {
        self.write(entries, true)
    }
}

// =============================================================================
// TESTS
// =============================================================================
