//! # Validation Module
//!
//! Record validation for the Tally ledger.
//!
//! - Validate records before any store mutation
//! - Reject malformed input with a specific `TallyError`
//! - Normalize descriptions (trimmed)

use crate::categories::CategoryCatalog;
use crate::primitives::{MAX_AMOUNT, MAX_CATEGORY_LENGTH, MAX_DESCRIPTION_LENGTH};
use crate::{Budget, BudgetId, Money, NewBudget, NewTransaction, TallyError, Transaction, YearMonth};
use rust_decimal::Decimal;

/// The Validator checks records against the catalog and input limits.
pub struct Validator;

impl Validator {
    /// Validate the fields shared by new and updated transactions.
    ///
    /// A transaction is valid if:
    /// - Amount is strictly positive and at most `MAX_AMOUNT`
    /// - Description is non-empty after trimming and within length limits
    /// - Category is non-empty and present in the catalog
    ///
    /// Returns the trimmed description.
    pub fn transaction_fields(
        amount: Money,
        description: &str,
        category: &str,
        catalog: &CategoryCatalog,
    ) -> Result<String, TallyError> {
        Self::amount(amount)?;

        let description = description.trim();
        if description.is_empty() {
            return Err(TallyError::MissingDescription);
        }
        if description.len() > MAX_DESCRIPTION_LENGTH {
            return Err(TallyError::DescriptionTooLong(
                description.len(),
                MAX_DESCRIPTION_LENGTH,
            ));
        }

        Self::category(category, catalog)?;
        Ok(description.to_string())
    }

    /// Validate and normalize a new transaction.
    pub fn new_transaction(
        input: NewTransaction,
        catalog: &CategoryCatalog,
    ) -> Result<NewTransaction, TallyError> {
        let description =
            Self::transaction_fields(input.amount, &input.description, &input.category, catalog)?;
        Ok(NewTransaction {
            description,
            ..input
        })
    }

    /// Validate and normalize a stored (or merged) transaction.
    pub fn transaction(
        tx: Transaction,
        catalog: &CategoryCatalog,
    ) -> Result<Transaction, TallyError> {
        let description =
            Self::transaction_fields(tx.amount, &tx.description, &tx.category, catalog)?;
        Ok(Transaction { description, ..tx })
    }

    /// Amount must be positive and no larger than `MAX_AMOUNT`.
    pub fn amount(amount: Money) -> Result<(), TallyError> {
        if !amount.is_positive() || amount.amount() > Decimal::from(MAX_AMOUNT) {
            return Err(TallyError::InvalidAmount);
        }
        Ok(())
    }

    /// Category must be non-empty, short, and known.
    pub fn category(category: &str, catalog: &CategoryCatalog) -> Result<(), TallyError> {
        if category.is_empty() {
            return Err(TallyError::MissingCategory);
        }
        if category.len() > MAX_CATEGORY_LENGTH || !catalog.contains(category) {
            return Err(TallyError::UnknownCategory(category.to_string()));
        }
        Ok(())
    }

    /// Validate the fields of a budget.
    ///
    /// A budget is valid if:
    /// - Amount is strictly positive and at most `MAX_AMOUNT`
    /// - Category is known and budgetable (not income)
    /// - Period is a real month within the accepted year range
    pub fn budget_fields(
        category: &str,
        amount: Money,
        period: YearMonth,
        catalog: &CategoryCatalog,
    ) -> Result<(), TallyError> {
        Self::amount(amount)?;
        Self::category(category, catalog)?;
        if !catalog.is_budgetable(category) {
            return Err(TallyError::NotBudgetable(category.to_string()));
        }
        YearMonth::new(period.year, period.month)?;
        Ok(())
    }

    pub fn new_budget(input: &NewBudget, catalog: &CategoryCatalog) -> Result<(), TallyError> {
        Self::budget_fields(&input.category, input.amount, input.period, catalog)
    }

    /// At most one budget per (category, month).
    ///
    /// `except` skips the budget being updated.
    pub fn budget_slot_free(
        budgets: &[Budget],
        category: &str,
        period: YearMonth,
        except: Option<BudgetId>,
    ) -> Result<(), TallyError> {
        let taken = budgets.iter().any(|b| {
            Some(b.id) != except && b.category == category && b.period == period
        });
        if taken {
            return Err(TallyError::DuplicateBudget {
                category: category.to_string(),
                period,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransactionKind;
    use chrono::NaiveDate;

    fn input(amount: i64, description: &str, category: &str) -> NewTransaction {
        NewTransaction {
            amount: Money::from_cents(amount),
            date: NaiveDate::from_ymd_opt(2026, 10, 1).expect("date"),
            description: description.to_string(),
            category: category.to_string(),
            kind: TransactionKind::Expense,
        }
    }

    #[test]
    fn valid_transaction_is_trimmed() {
        let catalog = CategoryCatalog::predefined();
        let checked =
            Validator::new_transaction(input(1250, "  Lunch  ", "Food & Dining"), &catalog)
                .expect("valid");
        assert_eq!(checked.description, "Lunch");
    }

    #[test]
    fn zero_and_negative_amounts_rejected() {
        let catalog = CategoryCatalog::predefined();
        for cents in [0, -100] {
            let result = Validator::new_transaction(input(cents, "x", "Other"), &catalog);
            assert!(matches!(result, Err(TallyError::InvalidAmount)));
        }
    }

    #[test]
    fn amounts_above_limit_rejected() {
        let catalog = CategoryCatalog::predefined();
        let at_limit = NewTransaction {
            amount: Money::new(Decimal::from(MAX_AMOUNT)),
            ..input(1, "Yacht", "Shopping")
        };
        assert!(Validator::new_transaction(at_limit, &catalog).is_ok());

        let huge = NewTransaction {
            amount: Money::parse("79228162514264337593543950335").expect("parse"),
            ..input(1, "Everything", "Shopping")
        };
        let result = Validator::new_transaction(huge, &catalog);
        assert!(matches!(result, Err(TallyError::InvalidAmount)));

        let period = YearMonth::new(2026, 10).expect("period");
        let over = Money::new(Decimal::from(MAX_AMOUNT) + Decimal::new(1, 2));
        let budget = Validator::budget_fields("Shopping", over, period, &catalog);
        assert!(matches!(budget, Err(TallyError::InvalidAmount)));
    }

    #[test]
    fn blank_description_rejected() {
        let catalog = CategoryCatalog::predefined();
        let result = Validator::new_transaction(input(100, "   ", "Other"), &catalog);
        assert!(matches!(result, Err(TallyError::MissingDescription)));
    }

    #[test]
    fn oversized_description_rejected() {
        let catalog = CategoryCatalog::predefined();
        let long = "a".repeat(MAX_DESCRIPTION_LENGTH + 1);
        let result = Validator::new_transaction(input(100, &long, "Other"), &catalog);
        assert!(matches!(result, Err(TallyError::DescriptionTooLong(..))));
    }

    #[test]
    fn missing_and_unknown_categories_rejected() {
        let catalog = CategoryCatalog::predefined();
        let missing = Validator::new_transaction(input(100, "x", ""), &catalog);
        assert!(matches!(missing, Err(TallyError::MissingCategory)));

        let unknown = Validator::new_transaction(input(100, "x", "Gardening"), &catalog);
        assert!(matches!(unknown, Err(TallyError::UnknownCategory(_))));
    }

    #[test]
    fn income_budget_rejected() {
        let catalog = CategoryCatalog::predefined();
        let period = YearMonth::new(2026, 10).expect("period");
        let result = Validator::budget_fields("Income", Money::from_cents(100), period, &catalog);
        assert!(matches!(result, Err(TallyError::NotBudgetable(_))));
    }

    #[test]
    fn occupied_budget_slot_rejected_unless_same_budget() {
        let period = YearMonth::new(2026, 10).expect("period");
        let budgets = vec![Budget {
            id: BudgetId(7),
            category: "Shopping".to_string(),
            amount: Money::from_cents(10000),
            period,
        }];

        let clash = Validator::budget_slot_free(&budgets, "Shopping", period, None);
        assert!(matches!(clash, Err(TallyError::DuplicateBudget { .. })));

        assert!(Validator::budget_slot_free(&budgets, "Shopping", period, Some(BudgetId(7))).is_ok());
        assert!(Validator::budget_slot_free(&budgets, "Travel", period, None).is_ok());
        assert!(Validator::budget_slot_free(&budgets, "Shopping", period.previous(), None).is_ok());
    }
}
