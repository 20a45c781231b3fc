//! # Tally HTTP API Module
//!
//! This module implements the local HTTP REST API using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET|POST /transactions` - List (filterable) or record transactions
//! - `GET|PUT|DELETE /transactions/{id}` - Single transaction
//! - `GET|POST /budgets` - List or create budgets
//! - `PUT|DELETE /budgets/{id}` - Single budget
//! - `GET /budgets/status` - Budget usage for a month
//! - `GET /summary` - Dashboard cards
//! - `GET /charts` - Chart series
//! - `GET /insights` - Analytics hints
//! - `GET /categories` - Category catalog
//!
//! Report endpoints take an optional `month=YYYY-MM` query parameter and
//! default to the current local month.
//!
//! ## Configuration (Environment Variables)
//!
//! - `TALLY_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)

mod handlers;
mod types;

// Re-export handlers and types for integration tests (via `tally::api::*`)
pub use handlers::{
    budget_status_handler, categories_handler, charts_handler, create_budget_handler,
    create_transaction_handler, delete_budget_handler, delete_transaction_handler,
    get_transaction_handler, health_handler, insights_handler, list_budgets_handler,
    list_transactions_handler, summary_handler, update_budget_handler,
    update_transaction_handler,
};
pub use types::{
    ApiResponse, CreateBudgetRequest, CreateTransactionRequest, DeleteResponse, HealthResponse,
    MonthQuery, TransactionQuery, UpdateBudgetRequest, UpdateTransactionRequest,
};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::get,
};
use std::sync::Arc;
use tally_core::{Ledger, ReportSettings, TallyError};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (1 MB).
const MAX_BODY_SIZE: usize = 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the ledger.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<RwLock<Ledger>>,
    pub report: ReportSettings,
}

impl AppState {
    #[must_use]
    pub fn new(ledger: Ledger, report: ReportSettings) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            report,
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

/// Build CORS layer from `TALLY_CORS_ORIGINS`.
///
/// - `*` allows all origins
/// - unset or unparsable falls back to localhost only
/// - otherwise a comma-separated origin list
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("TALLY_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (TALLY_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in TALLY_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods(ALLOWED_METHODS)
                    .allow_headers([header::CONTENT_TYPE])
            }
        }
        None => {
            tracing::debug!("CORS: No TALLY_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Localhost origins on the usual dev-server ports.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:5173",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:5173",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|origin| origin.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner): tracing, CORS, body limit.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route(
            "/transactions",
            get(handlers::list_transactions_handler).post(handlers::create_transaction_handler),
        )
        .route(
            "/transactions/{id}",
            get(handlers::get_transaction_handler)
                .put(handlers::update_transaction_handler)
                .delete(handlers::delete_transaction_handler),
        )
        .route(
            "/budgets",
            get(handlers::list_budgets_handler).post(handlers::create_budget_handler),
        )
        .route("/budgets/status", get(handlers::budget_status_handler))
        .route(
            "/budgets/{id}",
            axum::routing::put(handlers::update_budget_handler)
                .delete(handlers::delete_budget_handler),
        )
        .route("/summary", get(handlers::summary_handler))
        .route("/charts", get(handlers::charts_handler))
        .route("/insights", get(handlers::insights_handler))
        .route("/categories", get(handlers::categories_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer())
                .layer(DefaultBodyLimit::max(MAX_BODY_SIZE)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server; returns after Ctrl+C.
pub async fn run_server(
    addr: &str,
    ledger: Ledger,
    report: ReportSettings,
) -> Result<(), TallyError> {
    let state = AppState::new(ledger, report);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| TallyError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Tally HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| TallyError::IoError(format!("Server error: {}", e)))?;

    tracing::info!("Tally HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
