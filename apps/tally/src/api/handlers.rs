//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Every data endpoint answers with an [`ApiResponse`] envelope. Validation
//! failures map to 400, missing records to 404, budget conflicts to 409 and
//! storage failures to 500.

use super::{
    AppState,
    types::{
        ApiResponse, CreateBudgetRequest, CreateTransactionRequest, DeleteResponse,
        HealthResponse, MonthQuery, TransactionQuery, UpdateBudgetRequest,
        UpdateTransactionRequest,
    },
};
use crate::cli::current_month;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use tally_core::{
    BudgetId, Charts, Insights, Summary, TallyError, TransactionId, budget_overview,
};

// =============================================================================
// RESPONSE HELPERS
// =============================================================================

fn status_for(error: &TallyError) -> StatusCode {
    match error {
        TallyError::TransactionNotFound(_) | TallyError::BudgetNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        TallyError::DuplicateBudget { .. } => StatusCode::CONFLICT,
        e if e.is_validation() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn respond<T: Serialize>(
    ok: StatusCode,
    result: Result<T, TallyError>,
) -> (StatusCode, Json<ApiResponse<T>>) {
    match result {
        Ok(data) => (ok, Json(ApiResponse::success(data))),
        Err(e) => {
            let status = status_for(&e);
            if status == StatusCode::INTERNAL_SERVER_ERROR {
                tracing::error!("Request failed: {}", e);
            }
            (status, Json(ApiResponse::error(e.to_string())))
        }
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// TRANSACTION HANDLERS
// =============================================================================

/// Transaction history, newest first.
pub async fn list_transactions_handler(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> impl IntoResponse {
    let ledger = state.ledger.read().await;
    let result = ledger.transactions().map(|all| {
        let mut rows = query.to_filter().apply(&all);
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        rows
    });
    respond(StatusCode::OK, result)
}

/// Record a transaction.
pub async fn create_transaction_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateTransactionRequest>,
) -> impl IntoResponse {
    let mut ledger = state.ledger.write().await;
    let result = ledger.add_transaction(request.into_new_transaction());
    if let Ok(tx) = &result {
        tracing::info!("Added transaction {}", tx.id);
    }
    respond(StatusCode::CREATED, result)
}

pub async fn get_transaction_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let ledger = state.ledger.read().await;
    let id = TransactionId(id);
    let result = ledger
        .transaction(id)
        .and_then(|found| found.ok_or(TallyError::TransactionNotFound(id)));
    respond(StatusCode::OK, result)
}

/// Merge the given fields into a transaction.
pub async fn update_transaction_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<UpdateTransactionRequest>,
) -> impl IntoResponse {
    let patch = request.into_patch();
    let mut ledger = state.ledger.write().await;
    let id = TransactionId(id);
    let result = if patch.is_empty() {
        Err(TallyError::InvalidInput("Nothing to change".to_string()))
    } else {
        ledger
            .update_transaction(id, &patch)
            .and_then(|updated| updated.ok_or(TallyError::TransactionNotFound(id)))
    };
    if result.is_ok() {
        tracing::info!("Updated transaction {}", id);
    }
    respond(StatusCode::OK, result)
}

pub async fn delete_transaction_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let mut ledger = state.ledger.write().await;
    let id = TransactionId(id);
    let result = match ledger.delete_transaction(id) {
        Ok(true) => {
            tracing::info!("Deleted transaction {}", id);
            Ok(DeleteResponse { deleted: id.0 })
        }
        Ok(false) => Err(TallyError::TransactionNotFound(id)),
        Err(e) => Err(e),
    };
    respond(StatusCode::OK, result)
}

// =============================================================================
// BUDGET HANDLERS
// =============================================================================

/// All budgets, or those of `?month=`.
pub async fn list_budgets_handler(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> impl IntoResponse {
    let ledger = state.ledger.read().await;
    let result = ledger.budgets().and_then(|mut budgets| {
        if query.month.is_some() {
            let period = query.period_or(current_month())?;
            budgets.retain(|b| b.period == period);
        }
        Ok(budgets)
    });
    respond(StatusCode::OK, result)
}

pub async fn create_budget_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateBudgetRequest>,
) -> impl IntoResponse {
    let mut ledger = state.ledger.write().await;
    let result = request
        .to_new_budget()
        .and_then(|input| ledger.add_budget(input));
    if let Ok(budget) = &result {
        tracing::info!("Added budget {} ({} {})", budget.id, budget.category, budget.period);
    }
    respond(StatusCode::CREATED, result)
}

pub async fn update_budget_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<UpdateBudgetRequest>,
) -> impl IntoResponse {
    let mut ledger = state.ledger.write().await;
    let id = BudgetId(id);
    let result = request.to_patch().and_then(|patch| {
        ledger
            .update_budget(id, &patch)?
            .ok_or(TallyError::BudgetNotFound(id))
    });
    if result.is_ok() {
        tracing::info!("Updated budget {}", id);
    }
    respond(StatusCode::OK, result)
}

pub async fn delete_budget_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let mut ledger = state.ledger.write().await;
    let id = BudgetId(id);
    let result = match ledger.delete_budget(id) {
        Ok(true) => {
            tracing::info!("Deleted budget {}", id);
            Ok(DeleteResponse { deleted: id.0 })
        }
        Ok(false) => Err(TallyError::BudgetNotFound(id)),
        Err(e) => Err(e),
    };
    respond(StatusCode::OK, result)
}

/// Usage of every budget in a month.
pub async fn budget_status_handler(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> impl IntoResponse {
    let ledger = state.ledger.read().await;
    let result = query.period_or(current_month()).and_then(|period| {
        Ok(budget_overview(
            &ledger.budgets()?,
            &ledger.transactions()?,
            period,
            ledger.catalog(),
        ))
    });
    respond(StatusCode::OK, result)
}

// =============================================================================
// REPORT HANDLERS
// =============================================================================

/// Dashboard cards.
pub async fn summary_handler(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> impl IntoResponse {
    let ledger = state.ledger.read().await;
    let result = query.period_or(current_month()).and_then(|period| {
        Ok(Summary::build(
            &ledger.transactions()?,
            period,
            state.report,
        ))
    });
    respond(StatusCode::OK, result)
}

pub async fn charts_handler(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> impl IntoResponse {
    let ledger = state.ledger.read().await;
    let result = query.period_or(current_month()).and_then(|period| {
        Ok(Charts::build(
            &ledger.transactions()?,
            &ledger.budgets()?,
            period,
            ledger.catalog(),
            state.report,
        ))
    });
    respond(StatusCode::OK, result)
}

pub async fn insights_handler(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> impl IntoResponse {
    let ledger = state.ledger.read().await;
    let result = query.period_or(current_month()).and_then(|period| {
        Ok(Insights::build(
            &ledger.transactions()?,
            &ledger.budgets()?,
            period,
            ledger.catalog(),
        ))
    });
    respond(StatusCode::OK, result)
}

/// The category catalog in display order.
pub async fn categories_handler(State(state): State<AppState>) -> impl IntoResponse {
    let ledger = state.ledger.read().await;
    let categories = ledger.catalog().all().to_vec();
    respond(StatusCode::OK, Ok(categories))
}
