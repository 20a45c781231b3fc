//! # Browser Export Format
//!
//! JSON layout of the browser edition's local storage:
//!
//! ```json
//! {
//!   "finance-transactions": [
//!     {"id": "1718000000000", "amount": 42.5, "date": "2026-10-03",
//!      "description": "Groceries", "category": "Food & Dining",
//!      "type": "expense", "createdAt": "2026-10-03T18:20:00.000Z"}
//!   ],
//!   "finance-budgets": [
//!     {"id": "1718000000001", "category": "Food & Dining", "amount": 400,
//!      "month": "October", "year": 2026}
//!   ]
//! }
//! ```
//!
//! Ids are opaque strings in that layout; importing assigns fresh ledger ids.
//! Amounts are JSON numbers on export and accept numbers or strings on import.

use crate::{Budget, BudgetId, Money, TallyError, Transaction, TransactionId, TransactionKind, YearMonth};
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A transaction as stored by the browser edition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserTransaction {
    pub id: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    pub date: String,
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// A budget as stored by the browser edition (month by name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserBudget {
    pub id: String,
    pub category: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    pub month: String,
    pub year: i32,
}

/// Both record lists, keyed like local storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowserExport {
    #[serde(rename = "finance-transactions", default)]
    pub transactions: Vec<BrowserTransaction>,
    #[serde(rename = "finance-budgets", default)]
    pub budgets: Vec<BrowserBudget>,
}

impl BrowserExport {
    /// Build the browser layout from ledger records.
    #[must_use]
    pub fn from_records(transactions: &[Transaction], budgets: &[Budget]) -> Self {
        let transactions = transactions
            .iter()
            .map(|t| BrowserTransaction {
                id: t.id.to_string(),
                amount: t.amount.amount(),
                date: t.date.format("%Y-%m-%d").to_string(),
                description: t.description.clone(),
                category: t.category.clone(),
                kind: t.kind,
                created_at: Some(t.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            })
            .collect();

        let budgets = budgets
            .iter()
            .map(|b| BrowserBudget {
                id: b.id.to_string(),
                category: b.category.clone(),
                amount: b.amount.amount(),
                month: b.period.month_name().to_string(),
                year: b.period.year,
            })
            .collect();

        Self {
            transactions,
            budgets,
        }
    }

    /// Convert to ledger records with provisional ids (1, 2, ... per list).
    ///
    /// The ledger renumbers on import; only field conversion happens here.
    pub fn to_records(&self) -> Result<(Vec<Transaction>, Vec<Budget>), TallyError> {
        let transactions = self
            .transactions
            .iter()
            .zip(1u64..)
            .map(|(t, id)| {
                let date = parse_date(&t.date)?;
                Ok(Transaction {
                    id: TransactionId(id),
                    amount: Money::new(t.amount),
                    date,
                    description: t.description.clone(),
                    category: t.category.clone(),
                    kind: t.kind,
                    created_at: parse_created_at(t.created_at.as_deref(), date),
                })
            })
            .collect::<Result<Vec<_>, TallyError>>()?;

        let budgets = self
            .budgets
            .iter()
            .zip(1u64..)
            .map(|(b, id)| {
                Ok(Budget {
                    id: BudgetId(id),
                    category: b.category.clone(),
                    amount: Money::new(b.amount),
                    period: YearMonth::from_name(&b.month, b.year)?,
                })
            })
            .collect::<Result<Vec<_>, TallyError>>()?;

        Ok((transactions, budgets))
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part.
fn parse_date(raw: &str) -> Result<NaiveDate, TallyError> {
    let day = raw.trim().get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|_| TallyError::InvalidInput(format!("Invalid date: '{}'", raw)))
}

/// RFC 3339 timestamp, falling back to midnight UTC of the transaction date.
fn parse_created_at(raw: Option<&str>, date: NaiveDate) -> DateTime<Utc> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&date.and_time(NaiveTime::default())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "finance-transactions": [
            {"id": "1718000000000", "amount": 42.5, "date": "2026-10-03",
             "description": "Groceries", "category": "Food & Dining",
             "type": "expense", "createdAt": "2026-10-03T18:20:00.000Z"},
            {"id": "1718000000002", "amount": "3000", "date": "2026-10-01T00:00:00.000Z",
             "description": "Salary", "category": "Income", "type": "income"}
        ],
        "finance-budgets": [
            {"id": "1718000000001", "category": "Food & Dining", "amount": 400,
             "month": "October", "year": 2026}
        ]
    }"#;

    #[test]
    fn imports_browser_layout() {
        let export: BrowserExport = serde_json::from_str(SAMPLE).expect("parse");
        let (transactions, budgets) = export.to_records().expect("convert");

        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].amount, Money::from_cents(4250));
        assert_eq!(transactions[0].kind, TransactionKind::Expense);
        assert_eq!(transactions[1].amount, Money::from_cents(300000));
        assert_eq!(
            transactions[1].date,
            NaiveDate::from_ymd_opt(2026, 10, 1).expect("date")
        );

        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].period, YearMonth { year: 2026, month: 10 });
        assert_eq!(budgets[0].amount, Money::from_cents(40000));
    }

    #[test]
    fn missing_created_at_falls_back_to_date() {
        let export: BrowserExport = serde_json::from_str(SAMPLE).expect("parse");
        let (transactions, _) = export.to_records().expect("convert");
        assert_eq!(transactions[1].created_at.to_rfc3339(), "2026-10-01T00:00:00+00:00");
    }

    #[test]
    fn exports_numbers_and_month_names() {
        let export: BrowserExport = serde_json::from_str(SAMPLE).expect("parse");
        let (transactions, budgets) = export.to_records().expect("convert");

        let json = serde_json::to_value(BrowserExport::from_records(&transactions, &budgets))
            .expect("serialize");
        assert_eq!(json["finance-transactions"][0]["amount"], serde_json::json!(42.5));
        assert_eq!(json["finance-transactions"][0]["type"], "expense");
        assert_eq!(
            json["finance-transactions"][0]["createdAt"],
            "2026-10-03T18:20:00.000Z"
        );
        assert_eq!(json["finance-budgets"][0]["month"], "October");
    }

    #[test]
    fn bad_month_name_rejected() {
        let raw = r#"{"finance-budgets": [
            {"id": "1", "category": "Travel", "amount": 10, "month": "Smarch", "year": 2026}
        ]}"#;
        let export: BrowserExport = serde_json::from_str(raw).expect("parse");
        assert!(matches!(export.to_records(), Err(TallyError::InvalidPeriod(_))));
    }
}
