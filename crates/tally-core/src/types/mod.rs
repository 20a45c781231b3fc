//! # Core Type Definitions
//!
//! This module contains all record types for the Tally ledger:
//! - Identifiers (`TransactionId`, `BudgetId`)
//! - Exact money (`Money`) and calendar periods (`YearMonth`)
//! - Records (`Transaction`, `Budget`, `Category`) and their inputs
//! - Error types (`TallyError`)
//!
//! ## Exactness Guarantees
//!
//! Amounts are `rust_decimal::Decimal` values; no floating-point arithmetic
//! happens anywhere in the ledger. Amounts persist as decimal strings so a
//! save/load cycle is bit-exact.

use chrono::{DateTime, Datelike, Month, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};
use std::str::FromStr;
use thiserror::Error;

use crate::primitives::{MAX_YEAR, MIN_YEAR};

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Ledger-assigned identifier of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub u64);

/// Ledger-assigned identifier of a budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BudgetId(pub u64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for BudgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// MONEY
// =============================================================================

/// An exact monetary amount.
///
/// Persisted as a decimal string (`"12.50"`), rendered as US currency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(#[serde(with = "rust_decimal::serde::str")] pub Decimal);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Build an amount from whole cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Parse a user-entered amount such as `"12.5"` or `"$1,200.00"`.
    pub fn parse(input: &str) -> Result<Self, TallyError> {
        let cleaned: String = input
            .trim()
            .trim_start_matches('$')
            .chars()
            .filter(|c| *c != ',')
            .collect();
        Decimal::from_str_exact(&cleaned)
            .map(Self)
            .map_err(|_| TallyError::InvalidInput(format!("Not an amount: '{}'", input.trim())))
    }

    /// Get the raw decimal value.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Strictly greater than zero.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Absolute value.
    #[must_use]
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Round to cents (half away from zero).
    #[must_use]
    pub fn round_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// `self` as a percentage of `whole`, or `None` when `whole` is zero.
    #[must_use]
    pub fn percent_of(self, whole: Money) -> Option<Decimal> {
        if whole.0.is_zero() {
            return None;
        }
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.checked_div(whole.0))
    }
}

impl fmt::Display for Money {
    /// US currency format: `$1,234.56`, `-$12.00`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.round_cents().0;
        let digits = format!("{:.2}", rounded.abs());
        let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        write!(f, "{}${}.{}", sign, grouped, cents)
    }
}

impl FromStr for Money {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

// =============================================================================
// PERIOD
// =============================================================================

/// A calendar month, the aggregation window for budgets and summaries.
///
/// Orders chronologically; prints and parses as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Create a period, validating month (1-12) and year range.
    pub fn new(year: i32, month: u32) -> Result<Self, TallyError> {
        if !(1..=12).contains(&month) {
            return Err(TallyError::InvalidPeriod(format!("month {} out of range", month)));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(TallyError::InvalidPeriod(format!("year {} out of range", year)));
        }
        Ok(Self { year, month })
    }

    /// The month a calendar date falls in.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Build from a month name (`"January"`, `"jan"`) and a year.
    pub fn from_name(name: &str, year: i32) -> Result<Self, TallyError> {
        let month = name
            .trim()
            .parse::<Month>()
            .map_err(|_| TallyError::InvalidPeriod(format!("unknown month '{}'", name)))?;
        Self::new(year, month.number_from_month())
    }

    /// Check whether a date falls inside this month.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Long month name, e.g. `October`.
    #[must_use]
    pub fn month_name(&self) -> &'static str {
        u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("Unknown")
    }

    /// Three-letter month name, e.g. `Oct`.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let name = self.month_name();
        name.get(..3).unwrap_or(name)
    }

    /// `October 2026`
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.month_name(), self.year)
    }

    /// The month before this one.
    #[must_use]
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TallyError::InvalidPeriod(format!("expected YYYY-MM, got '{}'", s));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Display sign used in listings.
    #[must_use]
    pub fn sign(&self) -> &'static str {
        match self {
            Self::Income => "+",
            Self::Expense => "-",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(TallyError::InvalidInput(format!(
                "Transaction type must be 'income' or 'expense', got '{}'",
                other
            ))),
        }
    }
}

/// A single income or expense record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub amount: Money,
    /// Calendar date the money moved.
    pub date: NaiveDate,
    pub description: String,
    /// Category name (see `CategoryCatalog`).
    pub category: String,
    pub kind: TransactionKind,
    /// When the record was created in the ledger.
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    #[must_use]
    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    #[must_use]
    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    /// The month this transaction belongs to.
    #[must_use]
    pub fn period(&self) -> YearMonth {
        YearMonth::of(self.date)
    }
}

/// Input for creating a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub amount: Money,
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    pub kind: TransactionKind,
}

/// Partial update of a transaction. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPatch {
    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub kind: Option<TransactionKind>,
}

impl TransactionPatch {
    /// Check if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.date.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.kind.is_none()
    }

    /// Merge the patch into a copy of `base`.
    #[must_use]
    pub fn applied_to(&self, base: &Transaction) -> Transaction {
        let mut merged = base.clone();
        if let Some(amount) = self.amount {
            merged.amount = amount;
        }
        if let Some(date) = self.date {
            merged.date = date;
        }
        if let Some(description) = &self.description {
            merged.description = description.clone();
        }
        if let Some(category) = &self.category {
            merged.category = category.clone();
        }
        if let Some(kind) = self.kind {
            merged.kind = kind;
        }
        merged
    }
}

// =============================================================================
// BUDGETS
// =============================================================================

/// A target spending ceiling for a category within one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,
    pub category: String,
    pub amount: Money,
    pub period: YearMonth,
}

/// Input for creating a budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBudget {
    pub category: String,
    pub amount: Money,
    pub period: YearMonth,
}

/// Partial update of a budget. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetPatch {
    pub category: Option<String>,
    pub amount: Option<Money>,
    pub period: Option<YearMonth>,
}

impl BudgetPatch {
    /// Merge the patch into a copy of `base`.
    #[must_use]
    pub fn applied_to(&self, base: &Budget) -> Budget {
        let mut merged = base.clone();
        if let Some(category) = &self.category {
            merged.category = category.clone();
        }
        if let Some(amount) = self.amount {
            merged.amount = amount;
        }
        if let Some(period) = self.period {
            merged.period = period;
        }
        merged
    }
}

// =============================================================================
// CATEGORY
// =============================================================================

/// A named, colored classification tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
    /// `#rrggbb`
    pub color: String,
    pub icon: String,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Tally ledger.
///
/// - No silent failures
/// - Use `Result<T, TallyError>` for fallible operations
/// - The ledger never panics; all errors are recoverable
#[derive(Debug, Error)]
pub enum TallyError {
    /// Amounts must be strictly positive and at most `MAX_AMOUNT`.
    #[error("Amount must be greater than 0 and at most 1,000,000,000,000")]
    InvalidAmount,

    /// Description is empty after trimming.
    #[error("Description is required")]
    MissingDescription,

    /// Description exceeds the length limit.
    #[error("Description is {0} bytes; the limit is {1}")]
    DescriptionTooLong(usize, usize),

    /// Category is empty.
    #[error("Category is required")]
    MissingCategory,

    /// Category is not in the catalog.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Category exists but cannot carry a budget.
    #[error("Category '{0}' cannot be budgeted")]
    NotBudgetable(String),

    /// Malformed or out-of-range month/year.
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// A budget already exists for the category and month.
    #[error("A budget for '{category}' already exists in {period}")]
    DuplicateBudget { category: String, period: YearMonth },

    /// The requested transaction was not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// The requested budget was not found.
    #[error("Budget not found: {0}")]
    BudgetNotFound(BudgetId),

    /// Malformed user input (amount, type, date text).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The record store is unavailable or failed.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl TallyError {
    /// Whether the error was caused by the caller's input rather than storage.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount
                | Self::MissingDescription
                | Self::DescriptionTooLong(..)
                | Self::MissingCategory
                | Self::UnknownCategory(_)
                | Self::NotBudgetable(_)
                | Self::InvalidPeriod(_)
                | Self::InvalidInput(_)
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_parse_accepts_symbols_and_separators() {
        assert_eq!(Money::parse("$1,200.50").expect("parse"), Money::from_cents(120050));
        assert_eq!(Money::parse(" 12.5 ").expect("parse"), Money::from_cents(1250));
        assert!(Money::parse("twelve").is_err());
    }

    #[test]
    fn money_display_us_currency() {
        assert_eq!(Money::from_cents(123456).to_string(), "$1,234.56");
        assert_eq!(Money::from_cents(-1200).to_string(), "-$12.00");
        assert_eq!(Money::ZERO.to_string(), "$0.00");
        assert_eq!(Money::from_cents(100_000_000).to_string(), "$1,000,000.00");
        assert_eq!(Money::from_cents(99).to_string(), "$0.99");
        assert_eq!(Money::parse("0.005").expect("parse").to_string(), "$0.01");
    }

    #[test]
    fn money_percent_of_zero_is_none() {
        assert!(Money::from_cents(100).percent_of(Money::ZERO).is_none());
        assert_eq!(
            Money::from_cents(2500).percent_of(Money::from_cents(10000)),
            Some(Decimal::new(25, 0))
        );
    }

    #[test]
    fn money_serializes_as_string() {
        let json = serde_json::to_string(&Money::from_cents(1050)).expect("serialize");
        assert_eq!(json, "\"10.50\"");
    }

    #[test]
    fn year_month_parse_and_display() {
        let period: YearMonth = "2026-03".parse().expect("parse");
        assert_eq!(period, YearMonth { year: 2026, month: 3 });
        assert_eq!(period.to_string(), "2026-03");
        assert_eq!(period.month_name(), "March");
        assert_eq!(period.short_name(), "Mar");
        assert!("2026-13".parse::<YearMonth>().is_err());
        assert!("March".parse::<YearMonth>().is_err());
    }

    #[test]
    fn year_month_from_name() {
        let period = YearMonth::from_name("January", 2025).expect("name");
        assert_eq!(period, YearMonth { year: 2025, month: 1 });
        assert!(YearMonth::from_name("Smarch", 2025).is_err());
    }

    #[test]
    fn year_month_ordering_and_previous() {
        let dec = YearMonth::new(2025, 12).expect("valid");
        let jan = YearMonth::new(2026, 1).expect("valid");
        assert!(dec < jan);
        assert_eq!(jan.previous(), dec);
    }

    #[test]
    fn transaction_kind_from_str() {
        assert_eq!("Income".parse::<TransactionKind>().ok(), Some(TransactionKind::Income));
        assert_eq!("expense".parse::<TransactionKind>().ok(), Some(TransactionKind::Expense));
        assert!("transfer".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn empty_patch_is_identity() {
        let tx = Transaction {
            id: TransactionId(1),
            amount: Money::from_cents(500),
            date: NaiveDate::from_ymd_opt(2026, 1, 2).expect("date"),
            description: "Coffee".to_string(),
            category: "Food & Dining".to_string(),
            kind: TransactionKind::Expense,
            created_at: Utc::now(),
        };
        let patch = TransactionPatch::default();
        assert!(patch.is_empty());
        assert_eq!(patch.applied_to(&tx), tx);
    }
}
