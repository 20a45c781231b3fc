//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::render::{BAR_WIDTH, bar, health_label, print_json, transaction_line};
use crate::api;
use crate::config::{BackendKind, Settings};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tally_core::{
    Balance, BudgetId, BudgetPatch, Charts, Insights, Ledger, Money, NewBudget, NewTransaction,
    Summary, TallyError, TransactionFilter, TransactionId, TransactionKind, TransactionPatch,
    YearMonth, budget_overview,
    formats::{BrowserExport, is_snapshot, records_from_bytes, records_to_bytes},
};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for import (64 MB).
const MAX_IMPORT_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), TallyError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| TallyError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(TallyError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve an input path and make sure it is a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, TallyError> {
    let canonical = path.canonicalize().map_err(|e| {
        TallyError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(TallyError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve an output path whose parent directory must already exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, TallyError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        TallyError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(TallyError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| TallyError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

/// The local calendar month, used when no `--month` is given.
#[must_use]
pub fn current_month() -> YearMonth {
    YearMonth::of(Local::now().date_naive())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new ledger.
pub fn cmd_init(settings: &Settings, force: bool) -> Result<(), TallyError> {
    if settings.backend == BackendKind::Memory {
        println!("Memory backend selected: nothing to initialize");
        return Ok(());
    }

    if settings.database.exists() && !force {
        return Err(TallyError::IoError(
            "Ledger already exists. Use --force to overwrite.".to_string(),
        ));
    }

    let mut ledger = settings.open_ledger()?;
    ledger.clear()?;
    println!(
        "Initialized new {} ledger at {:?}",
        settings.backend, settings.database
    );

    Ok(())
}

// =============================================================================
// TRANSACTION COMMANDS
// =============================================================================

/// Record a transaction.
pub fn cmd_add(
    settings: &Settings,
    json_mode: bool,
    amount: Money,
    description: String,
    category: String,
    kind: TransactionKind,
    date: Option<NaiveDate>,
) -> Result<(), TallyError> {
    let mut ledger = settings.open_ledger()?;
    let tx = ledger.add_transaction(NewTransaction {
        amount,
        date: date.unwrap_or_else(|| Local::now().date_naive()),
        description,
        category,
        kind,
    })?;
    tracing::info!("Added transaction {}", tx.id);

    if json_mode {
        print_json(&tx);
    } else {
        println!("Added {}", transaction_line(&tx));
    }
    Ok(())
}

/// Change fields of a transaction.
pub fn cmd_edit(
    settings: &Settings,
    json_mode: bool,
    id: u64,
    patch: TransactionPatch,
) -> Result<(), TallyError> {
    if patch.is_empty() {
        return Err(TallyError::InvalidInput(
            "Nothing to change. Pass at least one field.".to_string(),
        ));
    }

    let mut ledger = settings.open_ledger()?;
    let id = TransactionId(id);
    let tx = ledger
        .update_transaction(id, &patch)?
        .ok_or(TallyError::TransactionNotFound(id))?;
    tracing::info!("Updated transaction {}", tx.id);

    if json_mode {
        print_json(&tx);
    } else {
        println!("Updated {}", transaction_line(&tx));
    }
    Ok(())
}

/// Delete a transaction.
pub fn cmd_delete(settings: &Settings, id: u64) -> Result<(), TallyError> {
    let mut ledger = settings.open_ledger()?;
    let id = TransactionId(id);
    if !ledger.delete_transaction(id)? {
        return Err(TallyError::TransactionNotFound(id));
    }
    tracing::info!("Deleted transaction {}", id);
    println!("Deleted transaction #{}", id);
    Ok(())
}

/// List transactions matching a filter.
pub fn cmd_list(
    settings: &Settings,
    json_mode: bool,
    filter: TransactionFilter,
    limit: Option<usize>,
) -> Result<(), TallyError> {
    let ledger = settings.open_ledger()?;
    let mut rows = filter.apply(&ledger.transactions()?);
    let matched = rows.len();
    if let Some(limit) = limit {
        rows.truncate(limit);
    }

    if json_mode {
        print_json(&rows);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }
    for tx in &rows {
        println!("{}", transaction_line(tx));
    }
    if rows.len() < matched {
        println!("... {} more", matched - rows.len());
    }
    Ok(())
}

// =============================================================================
// BUDGET COMMANDS
// =============================================================================

/// Set a budget.
pub fn cmd_budget_add(
    settings: &Settings,
    json_mode: bool,
    category: String,
    amount: Money,
    month: Option<YearMonth>,
) -> Result<(), TallyError> {
    let mut ledger = settings.open_ledger()?;
    let budget = ledger.add_budget(NewBudget {
        category,
        amount,
        period: month.unwrap_or_else(current_month),
    })?;
    tracing::info!("Added budget {}", budget.id);

    if json_mode {
        print_json(&budget);
    } else {
        println!(
            "Budget #{}: {} {} for {}",
            budget.id,
            budget.category,
            budget.amount,
            budget.period.label()
        );
    }
    Ok(())
}

/// Change a budget.
pub fn cmd_budget_edit(
    settings: &Settings,
    json_mode: bool,
    id: u64,
    patch: BudgetPatch,
) -> Result<(), TallyError> {
    let mut ledger = settings.open_ledger()?;
    let id = BudgetId(id);
    let budget = ledger
        .update_budget(id, &patch)?
        .ok_or(TallyError::BudgetNotFound(id))?;

    if json_mode {
        print_json(&budget);
    } else {
        println!(
            "Budget #{}: {} {} for {}",
            budget.id,
            budget.category,
            budget.amount,
            budget.period.label()
        );
    }
    Ok(())
}

/// Delete a budget.
pub fn cmd_budget_delete(settings: &Settings, id: u64) -> Result<(), TallyError> {
    let mut ledger = settings.open_ledger()?;
    let id = BudgetId(id);
    if !ledger.delete_budget(id)? {
        return Err(TallyError::BudgetNotFound(id));
    }
    println!("Deleted budget #{}", id);
    Ok(())
}

/// List budgets.
pub fn cmd_budget_list(
    settings: &Settings,
    json_mode: bool,
    month: Option<YearMonth>,
) -> Result<(), TallyError> {
    let ledger = settings.open_ledger()?;
    let mut budgets = ledger.budgets()?;
    if let Some(month) = month {
        budgets.retain(|b| b.period == month);
    }
    budgets.sort_by(|a, b| {
        b.period
            .cmp(&a.period)
            .then_with(|| a.category.cmp(&b.category))
    });

    if json_mode {
        print_json(&budgets);
        return Ok(());
    }

    if budgets.is_empty() {
        println!("No budgets set.");
        return Ok(());
    }
    for budget in &budgets {
        println!(
            "#{:<5} {}  {:<18} {:>12}",
            budget.id.0,
            budget.period,
            budget.category,
            budget.amount.to_string()
        );
    }
    Ok(())
}

/// Spending against each budget of a month.
pub fn cmd_budget_status(
    settings: &Settings,
    json_mode: bool,
    month: Option<YearMonth>,
) -> Result<(), TallyError> {
    let ledger = settings.open_ledger()?;
    let period = month.unwrap_or_else(current_month);
    let overview = budget_overview(
        &ledger.budgets()?,
        &ledger.transactions()?,
        period,
        ledger.catalog(),
    );

    if json_mode {
        print_json(&overview);
        return Ok(());
    }

    println!("Budgets for {}", period.label());
    println!("==============================");
    if overview.statuses.is_empty() {
        println!("No budgets set for this month.");
        return Ok(());
    }

    for status in &overview.statuses {
        println!(
            "{:<18} [{}] {:>6}%  {} of {}  ({})",
            status.category,
            bar(status.percent_used, BAR_WIDTH),
            status.percent_used,
            status.spent,
            status.budget,
            health_label(status.health)
        );
        if status.over_budget {
            println!("{:<18} over by {}", "", -status.remaining);
        }
    }
    println!();
    println!("Total budget:    {}", overview.total_budget);
    println!("Total spent:     {}", overview.total_spent);
    println!("Remaining:       {}", overview.total_remaining);
    Ok(())
}

// =============================================================================
// REPORT COMMANDS
// =============================================================================

/// Show the dashboard cards.
pub fn cmd_summary(
    settings: &Settings,
    json_mode: bool,
    month: Option<YearMonth>,
) -> Result<(), TallyError> {
    let ledger = settings.open_ledger()?;
    let period = month.unwrap_or_else(current_month);
    let summary = Summary::build(&ledger.transactions()?, period, settings.report);

    if json_mode {
        print_json(&summary);
        return Ok(());
    }

    println!("Tally Summary - {}", summary.label);
    println!("==============================");
    println!("Income:    {}", summary.totals.income);
    println!("Expenses:  {}", summary.totals.expenses);
    let balance = match summary.balance {
        Balance::Surplus => "surplus",
        Balance::Deficit => "deficit",
    };
    println!("Net:       {} ({})", summary.totals.net, balance);
    match &summary.top_category {
        Some(top) => println!("Top:       {} ({})", top.category, top.amount),
        None => println!("Top:       no expenses this month"),
    }
    println!();
    println!("Recent transactions:");
    if summary.recent.is_empty() {
        println!("  No transactions yet. Add one with `tally add`.");
    }
    for tx in &summary.recent {
        println!("  {}", transaction_line(tx));
    }
    Ok(())
}

/// Show chart series as text bars.
pub fn cmd_charts(
    settings: &Settings,
    json_mode: bool,
    month: Option<YearMonth>,
) -> Result<(), TallyError> {
    let ledger = settings.open_ledger()?;
    let period = month.unwrap_or_else(current_month);
    let charts = Charts::build(
        &ledger.transactions()?,
        &ledger.budgets()?,
        period,
        ledger.catalog(),
        settings.report,
    );

    if json_mode {
        print_json(&charts);
        return Ok(());
    }

    println!("Monthly expenses");
    println!("================");
    let peak = charts
        .monthly
        .iter()
        .map(|m| m.amount)
        .max()
        .unwrap_or(Money::ZERO);
    if charts.monthly.is_empty() {
        println!("No expense data yet.");
    }
    for month in &charts.monthly {
        let share = month.amount.percent_of(peak).unwrap_or_default();
        println!(
            "{:<9} [{}] {}",
            month.label,
            bar(share, BAR_WIDTH),
            month.amount
        );
    }

    println!();
    println!("Expenses by category");
    println!("====================");
    if charts.categories.is_empty() {
        println!("No expense data yet.");
    }
    for slice in &charts.categories {
        println!(
            "{:<18} [{}] {:>3}%  {}",
            slice.category,
            bar(slice.percent, BAR_WIDTH),
            slice.percent,
            slice.amount
        );
    }

    println!();
    println!("Budget vs actual - {}", period.label());
    println!("==============================");
    if charts.budgets.is_empty() {
        println!("No budgets set for this month.");
    }
    for row in &charts.budgets {
        println!(
            "{:<18} budget {:>12}  actual {:>12}",
            row.category,
            row.budget.to_string(),
            row.actual.to_string()
        );
    }
    Ok(())
}

/// Show analytics hints.
pub fn cmd_insights(
    settings: &Settings,
    json_mode: bool,
    month: Option<YearMonth>,
) -> Result<(), TallyError> {
    let ledger = settings.open_ledger()?;
    let period = month.unwrap_or_else(current_month);
    let insights = Insights::build(
        &ledger.transactions()?,
        &ledger.budgets()?,
        period,
        ledger.catalog(),
    );

    if json_mode {
        print_json(&insights);
        return Ok(());
    }

    println!("Insights - {}", period.label());
    println!("==============================");
    println!("Spending trend: {}", insights.spending_trend);
    println!("Savings rate:   {}", insights.savings_message);
    println!("Budget health:  {}", insights.budget_health);
    Ok(())
}

/// List known categories.
pub fn cmd_categories(settings: &Settings, json_mode: bool) -> Result<(), TallyError> {
    let catalog = &settings.catalog;

    if json_mode {
        print_json(&catalog.all());
        return Ok(());
    }

    for category in catalog.all() {
        let note = if catalog.is_budgetable(&category.name) {
            ""
        } else {
            "  (not budgetable)"
        };
        println!(
            "{:>3}  {}  {:<18} {}{}",
            category.id, category.color, category.name, category.icon, note
        );
    }
    Ok(())
}

// =============================================================================
// EXPORT / IMPORT COMMANDS
// =============================================================================

/// Export all records.
pub fn cmd_export(settings: &Settings, output: &Path, format: &str) -> Result<(), TallyError> {
    let validated_output = validate_output_path(output)?;
    let ledger = settings.open_ledger()?;

    let data = match format {
        "browser" | "json" => {
            let export = BrowserExport::from_records(&ledger.transactions()?, &ledger.budgets()?);
            serde_json::to_vec_pretty(&export)
                .map_err(|e| TallyError::SerializationError(e.to_string()))?
        }
        "snapshot" => records_to_bytes(&ledger.snapshot()?)?,
        _ => {
            return Err(TallyError::InvalidInput(format!(
                "Unknown format: {}. Use: browser, snapshot",
                format
            )));
        }
    };

    std::fs::write(&validated_output, &data)
        .map_err(|e| TallyError::IoError(format!("Write file: {}", e)))?;

    println!("Exported {} bytes to {:?}", data.len(), validated_output);
    Ok(())
}

/// Replace all records from a file.
///
/// Snapshot files are detected by their header; anything else is parsed as
/// a browser JSON export.
pub fn cmd_import(settings: &Settings, json_mode: bool, input: &Path) -> Result<(), TallyError> {
    let validated_path = validate_file_path(input)?;
    validate_file_size(&validated_path, MAX_IMPORT_FILE_SIZE)?;

    let data = std::fs::read(&validated_path)
        .map_err(|e| TallyError::IoError(format!("Read file: {}", e)))?;

    let mut ledger = settings.open_ledger()?;
    let (transactions, budgets) = import_bytes(&mut ledger, &data)?;
    tracing::info!(
        "Imported {} transactions and {} budgets from {:?}",
        transactions,
        budgets,
        validated_path
    );

    if json_mode {
        print_json(&serde_json::json!({
            "transactions": transactions,
            "budgets": budgets
        }));
    } else {
        println!(
            "Imported {} transactions and {} budgets",
            transactions, budgets
        );
    }
    Ok(())
}

/// Load a snapshot or browser export into the ledger.
///
/// Returns the number of (transactions, budgets) now stored.
pub fn import_bytes(ledger: &mut Ledger, data: &[u8]) -> Result<(usize, usize), TallyError> {
    if is_snapshot(data) {
        ledger.restore(records_from_bytes(data)?)?;
        return Ok((ledger.transactions()?.len(), ledger.budgets()?.len()));
    }

    let export: BrowserExport = serde_json::from_slice(data)
        .map_err(|e| TallyError::SerializationError(format!("Invalid export file: {}", e)))?;
    let (transactions, budgets) = export.to_records()?;
    ledger.import(transactions, budgets)
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the local HTTP API.
pub async fn cmd_serve(
    settings: &Settings,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), TallyError> {
    let ledger = settings.open_ledger()?;
    let host = host.unwrap_or_else(|| settings.host.clone());
    let port = port.unwrap_or(settings.port);

    println!("Tally API Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Backend:  {}", settings.backend);
    println!("  Database: {:?}", settings.database);
    println!();
    println!("Endpoints:");
    println!("  GET  /summary             - Dashboard cards");
    println!("  GET  /charts              - Chart series");
    println!("  GET  /insights            - Analytics hints");
    println!("  GET  /transactions        - Transaction history");
    println!("  POST /transactions        - Record a transaction");
    println!("  GET  /budgets/status      - Budget usage");
    println!("  GET  /categories          - Category catalog");
    println!("  GET  /health              - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, ledger, settings.report).await
}

// =============================================================================
// TESTS
// =============================================================================
