//! # tally-core
//!
//! The ledger engine for Tally - THE LOGIC.
//!
//! This crate holds everything that is not presentation: record types, the
//! category catalog, validation, the record store seam and its adapters,
//! the CRUD ledger, history filtering and reporting.
//!
//! ## Architectural Constraints
//!
//! - Pure and synchronous: NO async, NO network, NO logging
//! - Exact arithmetic: amounts are decimals, never floats
//! - Reports are pure functions over record slices; the current month is
//!   always an argument
//! - Every fallible operation returns `Result<T, TallyError>`

// =============================================================================
// MODULES
// =============================================================================

pub mod categories;
pub mod filter;
pub mod formats;
pub mod ledger;
pub mod primitives;
pub mod report;
pub mod storage;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Budget, BudgetId, BudgetPatch, Category, Money, NewBudget, NewTransaction, TallyError,
    Transaction, TransactionId, TransactionKind, TransactionPatch, YearMonth,
};

// =============================================================================
// RE-EXPORTS: Ledger
// =============================================================================

pub use categories::{CategoryCatalog, PREDEFINED_CATEGORIES, is_hex_color};
pub use filter::TransactionFilter;
pub use ledger::{Ledger, StorageBackend};
pub use report::{
    Balance, BudgetComparison, BudgetHealth, BudgetOverview, BudgetStatus, CategoryExpense,
    CategoryTotal, Charts, Insights, MonthTotals, MonthlyExpense, ReportSettings, Summary,
    budget_comparison, budget_overview, category_expenses, month_totals, monthly_expenses,
    recent_transactions, top_category,
};
pub use storage::RedbStore;
pub use store::{Entries, FileStore, MemoryStore, RecordStore};
pub use validation::Validator;

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{BrowserExport, PersistenceHeader, records_from_bytes, records_to_bytes};
