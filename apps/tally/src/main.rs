//! # Tally - Personal Finance Tracker
//!
//! ## Usage
//!
//! ```bash
//! # Record money
//! tally add 42.50 "Groceries" -C "Food & Dining"
//! tally add 3200 "October salary" -C Income -t income
//!
//! # Budgets and reports
//! tally budget add "Food & Dining" 400 -m 2026-10
//! tally summary -m 2026-10
//! tally charts
//!
//! # Serve the dashboard API
//! tally serve --port 8080
//! ```

use clap::Parser;
use tally::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // TALLY_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("TALLY_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "tally=debug,tally_core=debug,tower_http=debug"
    } else {
        "tally=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so stdout stays clean for --json-mode
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Tally startup banner.
fn print_banner() {
    println!(
        r#"
  ████████╗ █████╗ ██╗     ██╗  ██╗   ██╗
  ╚══██╔══╝██╔══██╗██║     ██║  ╚██╗ ██╔╝
     ██║   ███████║██║     ██║   ╚████╔╝
     ██║   ██╔══██║██║     ██║    ╚██╔╝
     ██║   ██║  ██║███████╗███████╗██║
     ╚═╝   ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝

  Personal Finance Tracker v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
