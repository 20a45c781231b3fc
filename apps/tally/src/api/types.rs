//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Amounts are accepted as JSON numbers or strings; dates as `YYYY-MM-DD`
//! and months as `YYYY-MM`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::{
    BudgetPatch, Money, NewBudget, NewTransaction, TallyError, TransactionFilter,
    TransactionKind, TransactionPatch, YearMonth,
};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// RESPONSE ENVELOPE
// =============================================================================

/// Envelope for every data endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// Body of a successful delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: u64,
}

// =============================================================================
// QUERY PARAMETERS
// =============================================================================

/// `?month=YYYY-MM`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

impl MonthQuery {
    /// The requested month, or `fallback` when none was given.
    pub fn period_or(&self, fallback: YearMonth) -> Result<YearMonth, TallyError> {
        match self.month.as_deref() {
            Some(text) if !text.trim().is_empty() => text.parse(),
            _ => Ok(fallback),
        }
    }
}

/// History filters for `GET /transactions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionKind>,
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub limit: Option<usize>,
}

impl TransactionQuery {
    #[must_use]
    pub fn to_filter(&self) -> TransactionFilter {
        TransactionFilter {
            search: self.search.clone(),
            category: self.category.clone(),
            kind: self.kind,
            since: self.since,
            until: self.until,
        }
    }
}

// =============================================================================
// TRANSACTION REQUESTS
// =============================================================================

/// Body of `POST /transactions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: TransactionKind,
}

impl CreateTransactionRequest {
    #[must_use]
    pub fn into_new_transaction(self) -> NewTransaction {
        NewTransaction {
            amount: Money::new(self.amount),
            date: self.date,
            description: self.description,
            category: self.category,
            kind: self.kind,
        }
    }
}

/// Body of `PUT /transactions/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTransactionRequest {
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type", alias = "kind")]
    pub kind: Option<TransactionKind>,
}

impl UpdateTransactionRequest {
    #[must_use]
    pub fn into_patch(self) -> TransactionPatch {
        TransactionPatch {
            amount: self.amount.map(Money::new),
            date: self.date,
            description: self.description,
            category: self.category,
            kind: self.kind,
        }
    }
}

// =============================================================================
// BUDGET REQUESTS
// =============================================================================

/// Body of `POST /budgets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBudgetRequest {
    pub category: String,
    pub amount: Decimal,
    /// `YYYY-MM`
    pub month: String,
}

impl CreateBudgetRequest {
    pub fn to_new_budget(&self) -> Result<NewBudget, TallyError> {
        Ok(NewBudget {
            category: self.category.clone(),
            amount: Money::new(self.amount),
            period: self.month.parse()?,
        })
    }
}

/// Body of `PUT /budgets/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBudgetRequest {
    pub category: Option<String>,
    pub amount: Option<Decimal>,
    pub month: Option<String>,
}

impl UpdateBudgetRequest {
    pub fn to_patch(&self) -> Result<BudgetPatch, TallyError> {
        let period = match &self.month {
            Some(text) => Some(text.parse()?),
            None => None,
        };
        Ok(BudgetPatch {
            category: self.category.clone(),
            amount: self.amount.map(Money::new),
            period,
        })
    }
}
