//! # Tally CLI Module
//!
//! This module implements the CLI interface for Tally.
//!
//! ## Available Commands
//!
//! - `init` - Initialize a new ledger
//! - `add` / `edit` / `delete` / `list` - Manage transactions
//! - `budget` - Manage monthly budgets and show their status
//! - `summary` - Dashboard cards for a month
//! - `charts` - Chart series (monthly, by category, budget vs actual)
//! - `insights` - Spending trend, savings rate and budget health
//! - `categories` - List known categories
//! - `export` / `import` - Browser JSON or binary snapshot
//! - `serve` - Start the local HTTP API

mod commands;
pub mod render;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tally_core::{Money, TallyError, TransactionKind, YearMonth};

use crate::config::{Settings, TallyConfig};

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Tally - personal finance tracker
///
/// Record income and expenses, set monthly budgets per category and see
/// where the money went.
#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the ledger database
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend: "redb" (ACID database), "file" (snapshot) or "memory"
    #[arg(short = 'B', long, global = true)]
    pub backend: Option<String>,

    /// Path to a tally.toml config file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new empty ledger
    Init {
        /// Wipe an existing ledger
        #[arg(short, long)]
        force: bool,
    },

    /// Record a transaction
    Add {
        /// Amount, e.g. 42.50 or "$1,200"
        amount: Money,

        /// What the money was for
        description: String,

        /// Category name
        #[arg(short = 'C', long, default_value = "Other")]
        category: String,

        /// income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: TransactionKind,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Change fields of a transaction
    Edit {
        /// Transaction id
        id: u64,

        #[arg(short, long)]
        amount: Option<Money>,

        #[arg(long)]
        description: Option<String>,

        #[arg(short = 'C', long)]
        category: Option<String>,

        #[arg(short = 't', long = "type")]
        kind: Option<TransactionKind>,

        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Delete a transaction
    Delete {
        /// Transaction id
        id: u64,
    },

    /// List transactions, newest first
    List {
        /// Text to find in description or category
        #[arg(short, long)]
        search: Option<String>,

        #[arg(short = 'C', long)]
        category: Option<String>,

        #[arg(short = 't', long = "type")]
        kind: Option<TransactionKind>,

        /// Earliest date (inclusive)
        #[arg(long)]
        since: Option<NaiveDate>,

        /// Latest date (inclusive)
        #[arg(long)]
        until: Option<NaiveDate>,

        /// Show at most this many rows
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Manage monthly budgets
    Budget {
        #[command(subcommand)]
        action: BudgetCommands,
    },

    /// Show the dashboard for a month
    Summary {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<YearMonth>,
    },

    /// Show chart series
    Charts {
        #[arg(short, long)]
        month: Option<YearMonth>,
    },

    /// Show spending insights
    Insights {
        #[arg(short, long)]
        month: Option<YearMonth>,
    },

    /// List known categories
    Categories,

    /// Export all records
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Export format (browser, snapshot)
        #[arg(short = 't', long, default_value = "browser")]
        format: String,
    },

    /// Replace all records from a browser export or snapshot
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Start the local HTTP API
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Budget subcommands.
#[derive(Subcommand, Debug)]
pub enum BudgetCommands {
    /// Set a budget for a category and month
    Add {
        category: String,
        amount: Money,
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<YearMonth>,
    },

    /// Change a budget
    Edit {
        /// Budget id
        id: u64,

        #[arg(short = 'C', long)]
        category: Option<String>,

        #[arg(short, long)]
        amount: Option<Money>,

        #[arg(short, long)]
        month: Option<YearMonth>,
    },

    /// Delete a budget
    Delete {
        /// Budget id
        id: u64,
    },

    /// List budgets, optionally for one month
    List {
        #[arg(short, long)]
        month: Option<YearMonth>,
    },

    /// Spending against each budget of a month
    Status {
        #[arg(short, long)]
        month: Option<YearMonth>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), TallyError> {
    let (config, config_path) = TallyConfig::discover(cli.config.as_deref())?;
    if let Some(path) = &config_path {
        tracing::debug!("Loaded config from {}", path.display());
    }
    let settings = Settings::resolve(&config, cli.database, cli.backend.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Init { force }) => cmd_init(&settings, force),
        Some(Commands::Add {
            amount,
            description,
            category,
            kind,
            date,
        }) => cmd_add(&settings, json_mode, amount, description, category, kind, date),
        Some(Commands::Edit {
            id,
            amount,
            description,
            category,
            kind,
            date,
        }) => cmd_edit(
            &settings,
            json_mode,
            id,
            tally_core::TransactionPatch {
                amount,
                date,
                description,
                category,
                kind,
            },
        ),
        Some(Commands::Delete { id }) => cmd_delete(&settings, id),
        Some(Commands::List {
            search,
            category,
            kind,
            since,
            until,
            limit,
        }) => cmd_list(
            &settings,
            json_mode,
            tally_core::TransactionFilter {
                search,
                category,
                kind,
                since,
                until,
            },
            limit,
        ),
        Some(Commands::Budget { action }) => match action {
            BudgetCommands::Add {
                category,
                amount,
                month,
            } => cmd_budget_add(&settings, json_mode, category, amount, month),
            BudgetCommands::Edit {
                id,
                category,
                amount,
                month,
            } => cmd_budget_edit(
                &settings,
                json_mode,
                id,
                tally_core::BudgetPatch {
                    category,
                    amount,
                    period: month,
                },
            ),
            BudgetCommands::Delete { id } => cmd_budget_delete(&settings, id),
            BudgetCommands::List { month } => cmd_budget_list(&settings, json_mode, month),
            BudgetCommands::Status { month } => cmd_budget_status(&settings, json_mode, month),
        },
        Some(Commands::Summary { month }) => cmd_summary(&settings, json_mode, month),
        Some(Commands::Charts { month }) => cmd_charts(&settings, json_mode, month),
        Some(Commands::Insights { month }) => cmd_insights(&settings, json_mode, month),
        Some(Commands::Categories) => cmd_categories(&settings, json_mode),
        Some(Commands::Export { output, format }) => cmd_export(&settings, &output, &format),
        Some(Commands::Import { input }) => cmd_import(&settings, json_mode, &input),
        Some(Commands::Serve { host, port }) => cmd_serve(&settings, host, port).await,
        None => {
            // No subcommand - show this month's dashboard
            cmd_summary(&settings, json_mode, None)
        }
    }
}
