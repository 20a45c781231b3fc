//! # Text Rendering
//!
//! Terminal output helpers: transaction rows and percentage bars.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use tally_core::{BudgetHealth, Transaction};

/// Width of chart and budget bars, in cells.
pub const BAR_WIDTH: usize = 30;

/// Print a value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

/// `#12  2026-10-03  -$42.50  Food & Dining  Groceries`
#[must_use]
pub fn transaction_line(tx: &Transaction) -> String {
    format!(
        "#{:<5} {}  {}{:>12}  {:<18} {}",
        tx.id.0,
        tx.date.format("%Y-%m-%d"),
        tx.kind.sign(),
        tx.amount.to_string(),
        tx.category,
        tx.description
    )
}

/// A bar filled to `percent` of `width` cells, capped at full.
#[must_use]
pub fn bar(percent: Decimal, width: usize) -> String {
    let capped = percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
    let filled = (capped * Decimal::from(width) / Decimal::ONE_HUNDRED)
        .floor()
        .to_usize()
        .unwrap_or(0)
        .min(width);
    format!("{}{}", "#".repeat(filled), ".".repeat(width - filled))
}

#[must_use]
pub fn health_label(health: BudgetHealth) -> &'static str {
    match health {
        BudgetHealth::OnTrack => "on track",
        BudgetHealth::Caution => "caution",
        BudgetHealth::Over => "over",
    }
}
