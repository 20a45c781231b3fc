//! # Ledger Module
//!
//! CRUD over the record store.
//!
//! The ledger owns a storage backend and the category catalog. Every write
//! validates first, then rewrites the affected record list together with
//! the id counter in a single `set_many` batch.
//!
//! ## Storage Backends
//!
//! - `InMemory`: `MemoryStore` (volatile)
//! - `File`: `FileStore` (one snapshot file)
//! - `Persistent`: `RedbStore` (embedded ACID database)

use crate::categories::CategoryCatalog;
use crate::formats::{decode_counter, decode_list, encode_counter, encode_list};
use crate::primitives::{BUDGETS_KEY, NEXT_ID_KEY, TRANSACTIONS_KEY};
use crate::storage::RedbStore;
use crate::store::{Entries, FileStore, MemoryStore, RecordStore};
use crate::validation::Validator;
use crate::{
    Budget, BudgetId, BudgetPatch, NewBudget, NewTransaction, TallyError, Transaction,
    TransactionId, TransactionPatch,
};
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Storage backend for a Ledger.
#[derive(Debug)]
pub enum StorageBackend {
    /// Volatile in-memory store.
    InMemory(MemoryStore),
    /// Single snapshot file.
    File(FileStore),
    /// Disk-backed store using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

impl StorageBackend {
    /// Short name used in logs and status output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::InMemory(_) => "memory",
            Self::File(_) => "file",
            Self::Persistent(_) => "redb",
        }
    }
}

impl RecordStore for StorageBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, TallyError> {
        match self {
            Self::InMemory(s) => s.get(key),
            Self::File(s) => s.get(key),
            Self::Persistent(s) => s.get(key),
        }
    }

    fn set_many(&mut self, entries: Entries) -> Result<(), TallyError> {
        match self {
            Self::InMemory(s) => s.set_many(entries),
            Self::File(s) => s.set_many(entries),
            Self::Persistent(s) => s.set_many(entries),
        }
    }

    fn entries(&self) -> Result<Entries, TallyError> {
        match self {
            Self::InMemory(s) => s.entries(),
            Self::File(s) => s.entries(),
            Self::Persistent(s) => s.entries(),
        }
    }

    fn replace_all(&mut self, entries: Entries) -> Result<(), TallyError> {
        match self {
            Self::InMemory(s) => s.replace_all(entries),
            Self::File(s) => s.replace_all(entries),
            Self::Persistent(s) => s.replace_all(entries),
        }
    }
}

// =============================================================================
// LEDGER
// =============================================================================

/// Transactions and budgets over a record store.
#[derive(Debug, Default)]
pub struct Ledger {
    backend: StorageBackend,
    catalog: CategoryCatalog,
}

impl Ledger {
    /// Create an empty in-memory ledger with the predefined categories.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_backend(backend: StorageBackend) -> Self {
        Self {
            backend,
            catalog: CategoryCatalog::predefined(),
        }
    }

    /// Open or create a redb database at the given path.
    pub fn open_redb(path: impl AsRef<Path>) -> Result<Self, TallyError> {
        Ok(Self::with_backend(StorageBackend::Persistent(
            RedbStore::open(path)?,
        )))
    }

    /// Open or create a snapshot file at the given path.
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self, TallyError> {
        Ok(Self::with_backend(StorageBackend::File(FileStore::open(
            path,
        )?)))
    }

    /// Replace the category catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: CategoryCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn backend(&self) -> &StorageBackend {
        &self.backend
    }

    // -------------------------------------------------------------------------
    // Record lists
    // -------------------------------------------------------------------------

    /// All transactions in stored order. A missing key reads as empty.
    pub fn transactions(&self) -> Result<Vec<Transaction>, TallyError> {
        self.read_list(TRANSACTIONS_KEY)
    }

    /// All budgets in stored order. A missing key reads as empty.
    pub fn budgets(&self) -> Result<Vec<Budget>, TallyError> {
        self.read_list(BUDGETS_KEY)
    }

    /// Overwrite the transaction list as-is.
    pub fn save_transactions(&mut self, transactions: &[Transaction]) -> Result<(), TallyError> {
        self.backend.set(TRANSACTIONS_KEY, encode_list(transactions)?)
    }

    /// Overwrite the budget list as-is.
    pub fn save_budgets(&mut self, budgets: &[Budget]) -> Result<(), TallyError> {
        self.backend.set(BUDGETS_KEY, encode_list(budgets)?)
    }

    pub fn transaction(&self, id: TransactionId) -> Result<Option<Transaction>, TallyError> {
        Ok(self.transactions()?.into_iter().find(|t| t.id == id))
    }

    pub fn budget(&self, id: BudgetId) -> Result<Option<Budget>, TallyError> {
        Ok(self.budgets()?.into_iter().find(|b| b.id == id))
    }

    /// Check whether any record or id has ever been written.
    pub fn has_data(&self) -> Result<bool, TallyError> {
        Ok(!self.backend.entries()?.is_empty())
    }

    // -------------------------------------------------------------------------
    // Transactions
    // -------------------------------------------------------------------------

    /// Validate, assign an id and creation time, and append.
    pub fn add_transaction(&mut self, input: NewTransaction) -> Result<Transaction, TallyError> {
        let input = Validator::new_transaction(input, &self.catalog)?;
        let mut transactions = self.transactions()?;
        let id = self.next_id()?;

        let tx = Transaction {
            id: TransactionId(id),
            amount: input.amount,
            date: input.date,
            description: input.description,
            category: input.category,
            kind: input.kind,
            created_at: Utc::now(),
        };
        transactions.push(tx.clone());
        self.commit(TRANSACTIONS_KEY, &transactions, Some(id))?;
        Ok(tx)
    }

    /// Merge `patch` into the transaction and revalidate.
    ///
    /// Returns `None` (and writes nothing) when the id is unknown.
    pub fn update_transaction(
        &mut self,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> Result<Option<Transaction>, TallyError> {
        let mut transactions = self.transactions()?;
        let Some(slot) = transactions.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };

        let updated = Validator::transaction(patch.applied_to(slot), &self.catalog)?;
        *slot = updated.clone();
        self.commit(TRANSACTIONS_KEY, &transactions, None)?;
        Ok(Some(updated))
    }

    /// Remove a transaction. Returns `false` when it did not exist.
    pub fn delete_transaction(&mut self, id: TransactionId) -> Result<bool, TallyError> {
        let mut transactions = self.transactions()?;
        let before = transactions.len();
        transactions.retain(|t| t.id != id);
        if transactions.len() == before {
            return Ok(false);
        }
        self.commit(TRANSACTIONS_KEY, &transactions, None)?;
        Ok(true)
    }

    // -------------------------------------------------------------------------
    // Budgets
    // -------------------------------------------------------------------------

    /// Validate and append a budget. One budget per category and month.
    pub fn add_budget(&mut self, input: NewBudget) -> Result<Budget, TallyError> {
        Validator::new_budget(&input, &self.catalog)?;
        let mut budgets = self.budgets()?;
        Validator::budget_slot_free(&budgets, &input.category, input.period, None)?;
        let id = self.next_id()?;

        let budget = Budget {
            id: BudgetId(id),
            category: input.category,
            amount: input.amount,
            period: input.period,
        };
        budgets.push(budget.clone());
        self.commit(BUDGETS_KEY, &budgets, Some(id))?;
        Ok(budget)
    }

    /// Merge `patch` into the budget and revalidate.
    ///
    /// Returns `None` when the id is unknown.
    pub fn update_budget(
        &mut self,
        id: BudgetId,
        patch: &BudgetPatch,
    ) -> Result<Option<Budget>, TallyError> {
        let mut budgets = self.budgets()?;
        let Some(index) = budgets.iter().position(|b| b.id == id) else {
            return Ok(None);
        };

        let updated = patch.applied_to(&budgets[index]);
        Validator::budget_fields(&updated.category, updated.amount, updated.period, &self.catalog)?;
        Validator::budget_slot_free(&budgets, &updated.category, updated.period, Some(id))?;

        budgets[index] = updated.clone();
        self.commit(BUDGETS_KEY, &budgets, None)?;
        Ok(Some(updated))
    }

    /// Remove a budget. Returns `false` when it did not exist.
    pub fn delete_budget(&mut self, id: BudgetId) -> Result<bool, TallyError> {
        let mut budgets = self.budgets()?;
        let before = budgets.len();
        budgets.retain(|b| b.id != id);
        if budgets.len() == before {
            return Ok(false);
        }
        self.commit(BUDGETS_KEY, &budgets, None)?;
        Ok(true)
    }

    // -------------------------------------------------------------------------
    // Bulk operations
    // -------------------------------------------------------------------------

    /// Replace every record with the given lists.
    ///
    /// All records are validated before anything is written. Transactions
    /// are renumbered from 1 in the given order, budgets continue after them.
    /// Returns the number of (transactions, budgets) imported.
    pub fn import(
        &mut self,
        transactions: Vec<Transaction>,
        budgets: Vec<Budget>,
    ) -> Result<(usize, usize), TallyError> {
        let mut next = 1u64;

        let mut checked_transactions = Vec::with_capacity(transactions.len());
        for tx in transactions {
            let mut tx = Validator::transaction(tx, &self.catalog)?;
            tx.id = TransactionId(next);
            next += 1;
            checked_transactions.push(tx);
        }

        let mut checked_budgets: Vec<Budget> = Vec::with_capacity(budgets.len());
        for mut budget in budgets {
            Validator::budget_fields(&budget.category, budget.amount, budget.period, &self.catalog)?;
            Validator::budget_slot_free(&checked_budgets, &budget.category, budget.period, None)?;
            budget.id = BudgetId(next);
            next += 1;
            checked_budgets.push(budget);
        }

        let mut entries = Entries::new();
        entries.insert(
            TRANSACTIONS_KEY.to_string(),
            encode_list(&checked_transactions)?,
        );
        entries.insert(BUDGETS_KEY.to_string(), encode_list(&checked_budgets)?);
        entries.insert(NEXT_ID_KEY.to_string(), encode_counter(next)?);
        self.backend.replace_all(entries)?;

        Ok((checked_transactions.len(), checked_budgets.len()))
    }

    /// Raw store entries, for snapshot export.
    pub fn snapshot(&self) -> Result<Entries, TallyError> {
        self.backend.entries()
    }

    /// Replace the store with snapshot entries.
    ///
    /// Known keys are decoded and amounts range-checked first; nothing is
    /// written if any fails.
    pub fn restore(&mut self, entries: Entries) -> Result<(), TallyError> {
        if let Some(bytes) = entries.get(TRANSACTIONS_KEY) {
            for tx in decode_list::<Transaction>(bytes)? {
                Validator::amount(tx.amount)?;
            }
        }
        if let Some(bytes) = entries.get(BUDGETS_KEY) {
            for budget in decode_list::<Budget>(bytes)? {
                Validator::amount(budget.amount)?;
            }
        }
        if let Some(bytes) = entries.get(NEXT_ID_KEY) {
            decode_counter(bytes)?;
        }
        self.backend.replace_all(entries)
    }

    /// Drop every record and reset the id counter.
    pub fn clear(&mut self) -> Result<(), TallyError> {
        self.backend.replace_all(Entries::new())
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn read_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, TallyError> {
        match self.backend.get(key)? {
            Some(bytes) => decode_list(&bytes),
            None => Ok(Vec::new()),
        }
    }

    /// The next unused id, shared by transactions and budgets.
    ///
    /// Never below any stored id, so lists written with `save_*` cannot
    /// cause reuse. Fails once `u64::MAX` has been handed out.
    fn next_id(&self) -> Result<u64, TallyError> {
        let counter = match self.backend.get(NEXT_ID_KEY)? {
            Some(bytes) => decode_counter(&bytes)?,
            None => 1,
        };
        let max_tx = self.transactions()?.iter().map(|t| t.id.0).max().unwrap_or(0);
        let max_budget = self.budgets()?.iter().map(|b| b.id.0).max().unwrap_or(0);
        let above_stored = max_tx
            .max(max_budget)
            .checked_add(1)
            .ok_or_else(id_space_exhausted)?;
        let id = counter.max(above_stored);
        // The counter must be able to advance past the id.
        id.checked_add(1).ok_or_else(id_space_exhausted)?;
        Ok(id)
    }

    /// Write a record list, plus the advanced counter when an id was used.
    fn commit<T: Serialize>(
        &mut self,
        key: &str,
        records: &[T],
        used_id: Option<u64>,
    ) -> Result<(), TallyError> {
        let mut entries = Entries::new();
        entries.insert(key.to_string(), encode_list(records)?);
        if let Some(id) = used_id {
            entries.insert(NEXT_ID_KEY.to_string(), encode_counter(id.saturating_add(1))?);
        }
        self.backend.set_many(entries)
    }
}

fn id_space_exhausted() -> TallyError {
    TallyError::InvalidInput("Id space exhausted".to_string())
}

// =============================================================================
// TESTS
// =============================================================================
