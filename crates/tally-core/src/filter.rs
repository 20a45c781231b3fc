//! # Transaction Filter
//!
//! Selection and ordering for the transaction history view.

use crate::{Transaction, TransactionKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Criteria for listing transactions. The default matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFilter {
    /// Case-insensitive substring of description or category.
    pub search: Option<String>,
    /// Exact category name.
    pub category: Option<String>,
    pub kind: Option<TransactionKind>,
    /// Inclusive lower date bound.
    pub since: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub until: Option<NaiveDate>,
}

impl TransactionFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a transaction passes every criterion.
    #[must_use]
    pub fn matches(&self, tx: &Transaction) -> bool {
        let needle = self
            .search
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_default();
        if !needle.is_empty()
            && !tx.description.to_lowercase().contains(&needle)
            && !tx.category.to_lowercase().contains(&needle)
        {
            return false;
        }
        if self.category.as_deref().is_some_and(|c| c != tx.category) {
            return false;
        }
        if self.kind.is_some_and(|k| k != tx.kind) {
            return false;
        }
        if self.since.is_some_and(|d| tx.date < d) {
            return false;
        }
        if self.until.is_some_and(|d| tx.date > d) {
            return false;
        }
        true
    }

    /// Matching transactions, newest date first.
    ///
    /// Same-date records keep their stored order.
    #[must_use]
    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        let mut matched: Vec<Transaction> = transactions
            .iter()
            .filter(|tx| self.matches(tx))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.date.cmp(&a.date));
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Money, TransactionId};
    use chrono::Utc;

    fn tx(id: u64, day: u32, description: &str, category: &str, kind: TransactionKind) -> Transaction {
        Transaction {
            id: TransactionId(id),
            amount: Money::from_cents(1000),
            date: NaiveDate::from_ymd_opt(2026, 10, day).expect("date"),
            description: description.to_string(),
            category: category.to_string(),
            kind,
            created_at: Utc::now(),
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx(1, 3, "Groceries", "Food & Dining", TransactionKind::Expense),
            tx(2, 1, "Salary", "Income", TransactionKind::Income),
            tx(3, 3, "Train ticket", "Transportation", TransactionKind::Expense),
            tx(4, 9, "Concert", "Entertainment", TransactionKind::Expense),
        ]
    }

    fn ids(list: &[Transaction]) -> Vec<u64> {
        list.iter().map(|t| t.id.0).collect()
    }

    #[test]
    fn default_filter_sorts_newest_first_stable() {
        let result = TransactionFilter::new().apply(&sample());
        assert_eq!(ids(&result), vec![4, 1, 3, 2]);
    }

    #[test]
    fn search_matches_description_or_category() {
        let by_description = TransactionFilter {
            search: Some("GROC".to_string()),
            ..TransactionFilter::default()
        };
        assert_eq!(ids(&by_description.apply(&sample())), vec![1]);

        let by_category = TransactionFilter {
            search: Some("transport".to_string()),
            ..TransactionFilter::default()
        };
        assert_eq!(ids(&by_category.apply(&sample())), vec![3]);

        let empty = TransactionFilter {
            search: Some(String::new()),
            ..TransactionFilter::default()
        };
        assert_eq!(empty.apply(&sample()).len(), 4);
    }

    #[test]
    fn search_whitespace_is_significant() {
        let spaced = TransactionFilter {
            search: Some(" ticket".to_string()),
            ..TransactionFilter::default()
        };
        assert_eq!(ids(&spaced.apply(&sample())), vec![3]);

        let padded = TransactionFilter {
            search: Some("salary ".to_string()),
            ..TransactionFilter::default()
        };
        assert!(padded.apply(&sample()).is_empty());

        let blank = TransactionFilter {
            search: Some("   ".to_string()),
            ..TransactionFilter::default()
        };
        assert!(blank.apply(&sample()).is_empty());
    }

    #[test]
    fn category_and_kind_are_exact() {
        let filter = TransactionFilter {
            kind: Some(TransactionKind::Expense),
            category: Some("Entertainment".to_string()),
            ..TransactionFilter::default()
        };
        assert_eq!(ids(&filter.apply(&sample())), vec![4]);

        let income = TransactionFilter {
            kind: Some(TransactionKind::Income),
            ..TransactionFilter::default()
        };
        assert_eq!(ids(&income.apply(&sample())), vec![2]);
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let filter = TransactionFilter {
            since: NaiveDate::from_ymd_opt(2026, 10, 3),
            until: NaiveDate::from_ymd_opt(2026, 10, 3),
            ..TransactionFilter::default()
        };
        assert_eq!(ids(&filter.apply(&sample())), vec![1, 3]);
    }
}
