//! # Report Module
//!
//! Aggregation over the record lists: dashboard cards, chart series, budget
//! status and analytics hints.
//!
//! Every function is a pure scan over slices. The "current" month is always
//! passed in, so a report over the same records is reproducible.
//!
//! ## Determinism
//!
//! - Grouping uses `BTreeMap`, so equal sums break ties by name
//! - Date ordering uses stable sorts; same-date records keep stored order
//! - Amounts stay exact; only share percentages are rounded

use crate::categories::CategoryCatalog;
use crate::primitives::{
    CAUTION_PERCENT, DEFAULT_MONTHLY_WINDOW, DEFAULT_RECENT_LIMIT, ON_TRACK_PERCENT,
};
use crate::{Budget, BudgetId, Money, Transaction, YearMonth};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// SETTINGS
// =============================================================================

/// Sizes of the list-shaped report sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Number of recent transactions on the dashboard.
    pub recent_limit: usize,
    /// Number of months in the monthly expense series.
    pub monthly_window: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            recent_limit: DEFAULT_RECENT_LIMIT,
            monthly_window: DEFAULT_MONTHLY_WINDOW,
        }
    }
}

fn round_percent(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

// =============================================================================
// MONTH TOTALS
// =============================================================================

/// Income and expense totals of one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthTotals {
    pub period: YearMonth,
    pub income: Money,
    pub expenses: Money,
    /// income - expenses
    pub net: Money,
    pub count: usize,
}

pub fn month_totals(transactions: &[Transaction], period: YearMonth) -> MonthTotals {
    let mut income = Money::ZERO;
    let mut expenses = Money::ZERO;
    let mut count = 0;

    for tx in transactions.iter().filter(|t| period.contains(t.date)) {
        if tx.is_income() {
            income += tx.amount;
        } else {
            expenses += tx.amount;
        }
        count += 1;
    }

    MonthTotals {
        period,
        income,
        expenses,
        net: income - expenses,
        count,
    }
}

/// A category with a summed amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Money,
}

/// Expense sums per category, ordered by category name.
fn expense_sums<'a>(
    transactions: impl Iterator<Item = &'a Transaction>,
) -> BTreeMap<&'a str, Money> {
    let mut sums: BTreeMap<&str, Money> = BTreeMap::new();
    for tx in transactions.filter(|t| t.is_expense()) {
        *sums.entry(tx.category.as_str()).or_default() += tx.amount;
    }
    sums
}

/// The expense category with the highest sum in `period`.
///
/// Equal sums resolve to the alphabetically first category.
pub fn top_category(transactions: &[Transaction], period: YearMonth) -> Option<CategoryTotal> {
    let sums = expense_sums(transactions.iter().filter(|t| period.contains(t.date)));

    let mut best: Option<(&str, Money)> = None;
    for (category, amount) in sums {
        if best.is_none_or(|(_, top)| amount > top) {
            best = Some((category, amount));
        }
    }

    best.map(|(category, amount)| CategoryTotal {
        category: category.to_string(),
        amount,
    })
}

/// The newest `limit` transactions by date, across all months.
pub fn recent_transactions(transactions: &[Transaction], limit: usize) -> Vec<Transaction> {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.into_iter().take(limit).cloned().collect()
}

// =============================================================================
// CHART SERIES
// =============================================================================

/// One bar of the monthly expense chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyExpense {
    pub period: YearMonth,
    /// `Oct 2026`
    pub label: String,
    pub amount: Money,
}

/// Expense sums per month, oldest first, limited to the last `window`
/// months that have expenses.
pub fn monthly_expenses(transactions: &[Transaction], window: usize) -> Vec<MonthlyExpense> {
    let mut by_month: BTreeMap<YearMonth, Money> = BTreeMap::new();
    for tx in transactions.iter().filter(|t| t.is_expense()) {
        *by_month.entry(tx.period()).or_default() += tx.amount;
    }

    let skip = by_month.len().saturating_sub(window);
    by_month
        .into_iter()
        .skip(skip)
        .map(|(period, amount)| MonthlyExpense {
            period,
            label: format!("{} {}", period.short_name(), period.year),
            amount,
        })
        .collect()
}

/// One slice of the category pie chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryExpense {
    pub category: String,
    pub amount: Money,
    pub color: String,
    /// Whole-number share of all expenses.
    #[serde(with = "rust_decimal::serde::float")]
    pub percent: Decimal,
}

/// All-time expense sums per category, largest first (ties by name).
pub fn category_expenses(
    transactions: &[Transaction],
    catalog: &CategoryCatalog,
) -> Vec<CategoryExpense> {
    let sums = expense_sums(transactions.iter());
    let total: Money = sums.values().sum();

    let mut slices: Vec<CategoryExpense> = sums
        .into_iter()
        .map(|(category, amount)| CategoryExpense {
            category: category.to_string(),
            amount,
            color: catalog.color_of(category).to_string(),
            percent: amount
                .percent_of(total)
                .map(|p| round_percent(p, 0))
                .unwrap_or_default(),
        })
        .collect();
    // Stable: equal amounts stay in name order
    slices.sort_by(|a, b| b.amount.cmp(&a.amount));
    slices
}

/// Budget against actual spending for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetComparison {
    pub category: String,
    pub budget: Money,
    pub actual: Money,
    pub color: String,
}

/// Expense total of one category within one month.
fn spent_in(transactions: &[Transaction], category: &str, period: YearMonth) -> Money {
    transactions
        .iter()
        .filter(|t| t.is_expense() && t.category == category && period.contains(t.date))
        .map(|t| t.amount)
        .sum()
}

/// Each budget of `period` (stored order) with its actual spending.
pub fn budget_comparison(
    budgets: &[Budget],
    transactions: &[Transaction],
    period: YearMonth,
    catalog: &CategoryCatalog,
) -> Vec<BudgetComparison> {
    budgets
        .iter()
        .filter(|b| b.period == period)
        .map(|b| BudgetComparison {
            category: b.category.clone(),
            budget: b.amount,
            actual: spent_in(transactions, &b.category, b.period),
            color: catalog.color_of(&b.category).to_string(),
        })
        .collect()
}

// =============================================================================
// BUDGET STATUS
// =============================================================================

/// Traffic-light state of a budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetHealth {
    /// At most 50% used.
    OnTrack,
    /// At most 80% used.
    Caution,
    /// More than 80% used.
    Over,
}

impl BudgetHealth {
    /// Classify a usage percentage.
    #[must_use]
    pub fn from_percent(percent: Decimal) -> Self {
        if percent <= Decimal::from(ON_TRACK_PERCENT) {
            Self::OnTrack
        } else if percent <= Decimal::from(CAUTION_PERCENT) {
            Self::Caution
        } else {
            Self::Over
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnTrack => "on_track",
            Self::Caution => "caution",
            Self::Over => "over",
        }
    }
}

/// Usage of a single budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub id: BudgetId,
    pub category: String,
    pub color: String,
    pub budget: Money,
    pub spent: Money,
    /// budget - spent; negative when overspent.
    pub remaining: Money,
    /// Rounded to one decimal place.
    #[serde(with = "rust_decimal::serde::float")]
    pub percent_used: Decimal,
    pub over_budget: bool,
    pub health: BudgetHealth,
}

/// All budgets of one month with their usage and totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetOverview {
    pub period: YearMonth,
    pub statuses: Vec<BudgetStatus>,
    pub total_budget: Money,
    pub total_spent: Money,
    pub total_remaining: Money,
}

impl BudgetOverview {
    /// Number of budgets whose spending exceeds the limit.
    #[must_use]
    pub fn over_budget_count(&self) -> usize {
        self.statuses.iter().filter(|s| s.over_budget).count()
    }
}

pub fn budget_overview(
    budgets: &[Budget],
    transactions: &[Transaction],
    period: YearMonth,
    catalog: &CategoryCatalog,
) -> BudgetOverview {
    let statuses: Vec<BudgetStatus> = budgets
        .iter()
        .filter(|b| b.period == period)
        .map(|b| {
            let spent = spent_in(transactions, &b.category, b.period);
            let percent_used = spent
                .percent_of(b.amount)
                .map(|p| round_percent(p, 1))
                .unwrap_or_default();
            BudgetStatus {
                id: b.id,
                category: b.category.clone(),
                color: catalog.color_of(&b.category).to_string(),
                budget: b.amount,
                spent,
                remaining: b.amount - spent,
                percent_used,
                over_budget: spent > b.amount,
                health: BudgetHealth::from_percent(percent_used),
            }
        })
        .collect();

    let total_budget: Money = statuses.iter().map(|s| s.budget).sum();
    let total_spent: Money = statuses.iter().map(|s| s.spent).sum();

    BudgetOverview {
        period,
        statuses,
        total_budget,
        total_spent,
        total_remaining: total_budget - total_spent,
    }
}

// =============================================================================
// DASHBOARD
// =============================================================================

/// Whether the month ended with money left over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Balance {
    Surplus,
    Deficit,
}

/// The dashboard cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// `October 2026`
    pub label: String,
    pub totals: MonthTotals,
    pub balance: Balance,
    pub top_category: Option<CategoryTotal>,
    pub recent: Vec<Transaction>,
}

impl Summary {
    #[must_use]
    pub fn build(transactions: &[Transaction], period: YearMonth, settings: ReportSettings) -> Self {
        let totals = month_totals(transactions, period);
        let balance = if totals.net.is_negative() {
            Balance::Deficit
        } else {
            Balance::Surplus
        };
        Self {
            label: period.label(),
            balance,
            top_category: top_category(transactions, period),
            recent: recent_transactions(transactions, settings.recent_limit),
            totals,
        }
    }
}

/// Data series for the charts tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charts {
    pub period: YearMonth,
    pub monthly: Vec<MonthlyExpense>,
    pub categories: Vec<CategoryExpense>,
    pub budgets: Vec<BudgetComparison>,
}

impl Charts {
    #[must_use]
    pub fn build(
        transactions: &[Transaction],
        budgets: &[Budget],
        period: YearMonth,
        catalog: &CategoryCatalog,
        settings: ReportSettings,
    ) -> Self {
        Self {
            period,
            monthly: monthly_expenses(transactions, settings.monthly_window),
            categories: category_expenses(transactions, catalog),
            budgets: budget_comparison(budgets, transactions, period, catalog),
        }
    }
}

// =============================================================================
// INSIGHTS
// =============================================================================

/// Short analytics hints for the insights panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
    pub period: YearMonth,
    /// Whole-percent change of expenses against the previous month.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub spending_change: Option<Decimal>,
    pub spending_trend: String,
    /// net / income as a whole percent; `None` without income.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub savings_rate: Option<Decimal>,
    pub savings_message: String,
    pub over_budget_count: usize,
    pub budget_health: String,
}

impl Insights {
    #[must_use]
    pub fn build(
        transactions: &[Transaction],
        budgets: &[Budget],
        period: YearMonth,
        catalog: &CategoryCatalog,
    ) -> Self {
        let current = month_totals(transactions, period);
        let previous = month_totals(transactions, period.previous());

        let spending_change = (current.expenses - previous.expenses)
            .percent_of(previous.expenses)
            .map(|p| round_percent(p, 0));
        let spending_trend = if current.expenses.is_positive() || previous.expenses.is_positive() {
            match spending_change {
                None => "No spending last month to compare against.".to_string(),
                Some(change) if change.is_sign_positive() && !change.is_zero() => {
                    format!("Spending is up {}% from last month.", change)
                }
                Some(change) if change.is_zero() => {
                    "Spending is flat compared to last month.".to_string()
                }
                Some(change) => format!("Spending is down {}% from last month.", change.abs()),
            }
        } else {
            "Add more transactions to see spending trends.".to_string()
        };

        let savings_rate = current
            .net
            .percent_of(current.income)
            .map(|p| round_percent(p, 0));
        let savings_message = match savings_rate {
            None => "Add income to calculate your savings rate.".to_string(),
            Some(rate) if rate.is_sign_negative() && !rate.is_zero() => format!(
                "You spent {}% more than you earned this month.",
                rate.abs()
            ),
            Some(rate) => format!("You saved {}% of your income this month.", rate),
        };

        let overview = budget_overview(budgets, transactions, period, catalog);
        let over_budget_count = overview.over_budget_count();
        let budget_health = if overview.statuses.is_empty() {
            "Set budgets to track your spending health.".to_string()
        } else if over_budget_count == 0 {
            "All budgets are on track.".to_string()
        } else if over_budget_count == 1 {
            "1 category is over budget.".to_string()
        } else {
            format!("{} categories are over budget.", over_budget_count)
        };

        Self {
            period,
            spending_change,
            spending_trend,
            savings_rate,
            savings_message,
            over_budget_count,
            budget_health,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TransactionId, TransactionKind};
    use chrono::{NaiveDate, Utc};

    fn tx(id: u64, date: (i32, u32, u32), cents: i64, category: &str, kind: TransactionKind) -> Transaction {
        Transaction {
            id: TransactionId(id),
            amount: Money::from_cents(cents),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).expect("date"),
            description: format!("tx {}", id),
            category: category.to_string(),
            kind,
            created_at: Utc::now(),
        }
    }

    fn expense(id: u64, date: (i32, u32, u32), cents: i64, category: &str) -> Transaction {
        tx(id, date, cents, category, TransactionKind::Expense)
    }

    fn income(id: u64, date: (i32, u32, u32), cents: i64) -> Transaction {
        tx(id, date, cents, "Income", TransactionKind::Income)
    }

    fn budget(id: u64, category: &str, cents: i64, period: YearMonth) -> Budget {
        Budget {
            id: BudgetId(id),
            category: category.to_string(),
            amount: Money::from_cents(cents),
            period,
        }
    }

    fn october() -> YearMonth {
        YearMonth::new(2026, 10).expect("period")
    }

    fn ledger() -> Vec<Transaction> {
        vec![
            income(1, (2026, 10, 1), 300_000),
            expense(2, (2026, 10, 2), 12_000, "Food & Dining"),
            expense(3, (2026, 10, 5), 4_550, "Transportation"),
            expense(4, (2026, 10, 5), 8_000, "Food & Dining"),
            expense(5, (2026, 9, 20), 50_000, "Travel"),
            income(6, (2026, 9, 1), 300_000),
        ]
    }

    #[test]
    fn month_totals_only_count_period() {
        let totals = month_totals(&ledger(), october());
        assert_eq!(totals.income, Money::from_cents(300_000));
        assert_eq!(totals.expenses, Money::from_cents(24_550));
        assert_eq!(totals.net, Money::from_cents(275_450));
        assert_eq!(totals.count, 4);
    }

    #[test]
    fn top_category_by_sum_with_name_tiebreak() {
        let top = top_category(&ledger(), october()).expect("top");
        assert_eq!(top.category, "Food & Dining");
        assert_eq!(top.amount, Money::from_cents(20_000));

        let tied = vec![
            expense(1, (2026, 10, 1), 500, "Travel"),
            expense(2, (2026, 10, 1), 500, "Shopping"),
        ];
        assert_eq!(
            top_category(&tied, october()).expect("top").category,
            "Shopping"
        );
    }

    #[test]
    fn top_category_none_without_expenses() {
        let only_income = vec![income(1, (2026, 10, 1), 1000)];
        assert!(top_category(&only_income, october()).is_none());
    }

    #[test]
    fn recent_transactions_newest_first_stable() {
        let recent = recent_transactions(&ledger(), 3);
        let ids: Vec<u64> = recent.iter().map(|t| t.id.0).collect();
        assert_eq!(ids, vec![3, 4, 2]);
        assert!(recent_transactions(&[], 3).is_empty());
    }

    #[test]
    fn monthly_expenses_keeps_last_window() {
        let mut txs = ledger();
        txs.push(expense(7, (2025, 12, 31), 100, "Other"));
        txs.push(expense(8, (2026, 1, 1), 200, "Other"));

        let series = monthly_expenses(&txs, 3);
        let labels: Vec<&str> = series.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Jan 2026", "Sep 2026", "Oct 2026"]);
        assert_eq!(series[2].amount, Money::from_cents(24_550));
    }

    #[test]
    fn category_expenses_share_and_order() {
        let catalog = CategoryCatalog::predefined();
        let slices = category_expenses(&ledger(), &catalog);

        let names: Vec<&str> = slices.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(names, vec!["Travel", "Food & Dining", "Transportation"]);
        // 50000 / 74550 = 67.07%
        assert_eq!(slices[0].percent, Decimal::from(67));
        assert_eq!(slices[0].color, "#ec4899");
    }

    #[test]
    fn budget_comparison_for_period_only() {
        let catalog = CategoryCatalog::predefined();
        let budgets = vec![
            budget(10, "Food & Dining", 40_000, october()),
            budget(11, "Travel", 40_000, october().previous()),
        ];
        let rows = budget_comparison(&budgets, &ledger(), october(), &catalog);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].actual, Money::from_cents(20_000));
        assert_eq!(rows[0].color, "#ef4444");
    }

    #[test]
    fn budget_overview_health_thresholds() {
        let catalog = CategoryCatalog::predefined();
        let budgets = vec![
            budget(10, "Food & Dining", 40_000, october()),
            budget(11, "Transportation", 5_000, october()),
            budget(12, "Shopping", 10_000, october()),
        ];
        let mut txs = ledger();
        txs.push(expense(20, (2026, 10, 9), 1_000, "Transportation"));

        let overview = budget_overview(&budgets, &txs, october(), &catalog);
        let food = &overview.statuses[0];
        assert_eq!(food.percent_used, Decimal::new(500, 1));
        assert_eq!(food.health, BudgetHealth::OnTrack);

        let transport = &overview.statuses[1];
        assert_eq!(transport.spent, Money::from_cents(5_550));
        assert_eq!(transport.remaining, Money::from_cents(-550));
        assert_eq!(transport.percent_used, Decimal::new(1110, 1));
        assert!(transport.over_budget);
        assert_eq!(transport.health, BudgetHealth::Over);

        assert_eq!(overview.total_budget, Money::from_cents(55_000));
        assert_eq!(overview.total_spent, Money::from_cents(25_550));
        assert_eq!(overview.total_remaining, Money::from_cents(29_450));
        assert_eq!(overview.over_budget_count(), 1);
    }

    #[test]
    fn health_boundaries_inclusive() {
        assert_eq!(BudgetHealth::from_percent(Decimal::from(50)), BudgetHealth::OnTrack);
        assert_eq!(BudgetHealth::from_percent(Decimal::new(501, 1)), BudgetHealth::Caution);
        assert_eq!(BudgetHealth::from_percent(Decimal::from(80)), BudgetHealth::Caution);
        assert_eq!(BudgetHealth::from_percent(Decimal::new(801, 1)), BudgetHealth::Over);
    }

    #[test]
    fn summary_marks_deficit() {
        let txs = vec![
            income(1, (2026, 10, 1), 1_000),
            expense(2, (2026, 10, 2), 2_500, "Shopping"),
        ];
        let summary = Summary::build(&txs, october(), ReportSettings::default());
        assert_eq!(summary.balance, Balance::Deficit);
        assert_eq!(summary.totals.net, Money::from_cents(-1_500));
        assert_eq!(summary.label, "October 2026");
        assert_eq!(summary.recent.len(), 2);
    }

    #[test]
    fn insights_trend_and_savings() {
        let catalog = CategoryCatalog::predefined();
        let insights = Insights::build(&ledger(), &[], october(), &catalog);

        // 24550 vs 50000 = -50.9%
        assert_eq!(insights.spending_change, Some(Decimal::from(-51)));
        assert_eq!(insights.spending_trend, "Spending is down 51% from last month.");
        // 275450 / 300000 = 91.8%
        assert_eq!(insights.savings_rate, Some(Decimal::from(92)));
        assert_eq!(
            insights.budget_health,
            "Set budgets to track your spending health."
        );
    }

    #[test]
    fn insights_empty_states() {
        let catalog = CategoryCatalog::predefined();
        let insights = Insights::build(&[], &[], october(), &catalog);
        assert_eq!(
            insights.spending_trend,
            "Add more transactions to see spending trends."
        );
        assert!(insights.savings_rate.is_none());
        assert_eq!(
            insights.savings_message,
            "Add income to calculate your savings rate."
        );
    }
}
