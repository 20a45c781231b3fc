//! # Ledger Constants
//!
//! Hardcoded constants for the Tally ledger: storage keys, snapshot format
//! markers, validation limits and reporting defaults.

// =============================================================================
// STORAGE KEYS
// =============================================================================

/// Key of the transaction record list.
///
/// Matches the local-storage key used by the browser edition, so snapshots
/// and browser exports line up key-for-key.
pub const TRANSACTIONS_KEY: &str = "finance-transactions";

/// Key of the budget record list.
pub const BUDGETS_KEY: &str = "finance-budgets";

/// Key of the id counter shared by transactions and budgets.
pub const NEXT_ID_KEY: &str = "finance-next-id";

// =============================================================================
// SNAPSHOT FORMAT
// =============================================================================

/// Magic bytes for the Tally snapshot header.
///
/// - File Header = Magic Bytes ("TALY") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"TALY";

/// Current snapshot format version.
///
/// Increment this when making breaking changes to the record encoding.
pub const FORMAT_VERSION: u8 = 1;

// =============================================================================
// CATEGORIES
// =============================================================================

/// Color used for categories missing from the catalog.
pub const DEFAULT_CATEGORY_COLOR: &str = "#6b7280";

/// Icon used for user categories that do not name one.
pub const DEFAULT_CATEGORY_ICON: &str = "Tag";

/// The category reserved for income; it never carries a budget.
pub const INCOME_CATEGORY: &str = "Income";

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for descriptions (after trimming), in bytes.
pub const MAX_DESCRIPTION_LENGTH: usize = 256;

/// Largest accepted amount, in whole currency units.
///
/// Keeps report sums far below `Decimal::MAX`.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Maximum length for category names, in bytes.
pub const MAX_CATEGORY_LENGTH: usize = 64;

/// Earliest year accepted for budget periods.
pub const MIN_YEAR: i32 = 1970;

/// Latest year accepted for budget periods.
pub const MAX_YEAR: i32 = 9999;

// =============================================================================
// REPORTING DEFAULTS
// =============================================================================

/// Number of transactions shown in the "recent" card.
pub const DEFAULT_RECENT_LIMIT: usize = 3;

/// Number of months shown in the monthly expenses chart.
pub const DEFAULT_MONTHLY_WINDOW: usize = 6;

/// Budgets at or below this share used are on track.
pub const ON_TRACK_PERCENT: i64 = 50;

/// Budgets at or below this share used (and above on-track) need caution.
pub const CAUTION_PERCENT: i64 = 80;
