//! Integration tests for the Tally HTTP API.
//!
//! Uses axum-test to test the API handlers without starting a real server.
//! Report requests always pass `month=` so results do not depend on the
//! current date.

#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::NaiveDate;
use serde_json::json;
use tally::api::{ApiResponse, AppState, DeleteResponse, HealthResponse, create_router};
use tally_core::{
    Budget, BudgetOverview, Category, Charts, Insights, Ledger, Money, NewTransaction,
    ReportSettings, Summary, Transaction, TransactionKind,
};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn server_for(ledger: Ledger) -> TestServer {
    let state = AppState::new(ledger, ReportSettings::default());
    TestServer::new(create_router(state)).unwrap()
}

/// Create a test server with an empty in-memory ledger.
fn create_test_server() -> TestServer {
    server_for(Ledger::new())
}

fn record(
    ledger: &mut Ledger,
    cents: i64,
    day: (i32, u32, u32),
    description: &str,
    category: &str,
    kind: TransactionKind,
) {
    ledger
        .add_transaction(NewTransaction {
            amount: Money::from_cents(cents),
            date: NaiveDate::from_ymd_opt(day.0, day.1, day.2).unwrap(),
            description: description.to_string(),
            category: category.to_string(),
            kind,
        })
        .unwrap();
}

/// September and October 2026 activity.
fn create_populated_test_server() -> TestServer {
    let mut ledger = Ledger::new();
    record(&mut ledger, 300_000, (2026, 10, 1), "Salary", "Income", TransactionKind::Income);
    record(&mut ledger, 30_000, (2026, 10, 3), "Groceries", "Food & Dining", TransactionKind::Expense);
    record(&mut ledger, 15_000, (2026, 10, 8), "Train pass", "Transportation", TransactionKind::Expense);
    record(&mut ledger, 20_000, (2026, 9, 12), "Groceries", "Food & Dining", TransactionKind::Expense);
    server_for(ledger)
}

// =============================================================================
// HEALTH
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server();
    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: HealthResponse = response.json();
    assert_eq!(body.status, "ok");
    assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

#[tokio::test]
async fn test_create_and_get_transaction() {
    let server = create_test_server();

    let response = server
        .post("/transactions")
        .json(&json!({
            "amount": "42.50",
            "date": "2026-10-03",
            "description": "Groceries",
            "category": "Food & Dining",
            "type": "expense"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: ApiResponse<Transaction> = response.json();
    assert!(created.success);
    let tx = created.data.unwrap();
    assert_eq!(tx.amount, Money::from_cents(4250));

    let response = server.get(&format!("/transactions/{}", tx.id.0)).await;
    response.assert_status_ok();
    let fetched: ApiResponse<Transaction> = response.json();
    assert_eq!(fetched.data.unwrap(), tx);
}

#[tokio::test]
async fn test_create_transaction_accepts_numeric_amount() {
    let server = create_test_server();
    let response = server
        .post("/transactions")
        .json(&json!({
            "amount": 1200,
            "date": "2026-10-01",
            "description": "Freelance",
            "category": "Income",
            "type": "income"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: ApiResponse<Transaction> = response.json();
    assert_eq!(created.data.unwrap().amount, Money::from_cents(120_000));
}

#[tokio::test]
async fn test_create_transaction_rejects_invalid_fields() {
    let server = create_test_server();

    let zero = json!({
        "amount": "0",
        "date": "2026-10-03",
        "description": "Nothing",
        "category": "Other",
        "type": "expense"
    });
    let response = server.post("/transactions").json(&zero).await;
    response.assert_status_bad_request();
    let body: ApiResponse<Transaction> = response.json();
    assert!(!body.success);
    assert!(body.error.is_some());

    let unknown = json!({
        "amount": "5",
        "date": "2026-10-03",
        "description": "Mystery",
        "category": "Not A Category",
        "type": "expense"
    });
    server
        .post("/transactions")
        .json(&unknown)
        .await
        .assert_status_bad_request();

    let blank = json!({
        "amount": "5",
        "date": "2026-10-03",
        "description": "   ",
        "category": "Other",
        "type": "expense"
    });
    server
        .post("/transactions")
        .json(&blank)
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_get_missing_transaction_is_not_found() {
    let server = create_test_server();
    server.get("/transactions/999").await.assert_status_not_found();
}

#[tokio::test]
async fn test_update_transaction() {
    let server = create_populated_test_server();

    let response = server
        .put("/transactions/2")
        .json(&json!({ "amount": "325.10", "description": "Big shop" }))
        .await;
    response.assert_status_ok();
    let updated: ApiResponse<Transaction> = response.json();
    let tx = updated.data.unwrap();
    assert_eq!(tx.amount, Money::from_cents(32_510));
    assert_eq!(tx.description, "Big shop");
    assert_eq!(tx.category, "Food & Dining");
}

#[tokio::test]
async fn test_update_transaction_requires_a_field() {
    let server = create_populated_test_server();
    server
        .put("/transactions/2")
        .json(&json!({}))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_update_missing_transaction_is_not_found() {
    let server = create_populated_test_server();
    server
        .put("/transactions/404")
        .json(&json!({ "description": "Ghost" }))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_delete_transaction() {
    let server = create_populated_test_server();

    let response = server.delete("/transactions/3").await;
    response.assert_status_ok();
    let body: ApiResponse<DeleteResponse> = response.json();
    assert_eq!(body.data.unwrap().deleted, 3);

    server.delete("/transactions/3").await.assert_status_not_found();
    server.get("/transactions/3").await.assert_status_not_found();
}

#[tokio::test]
async fn test_list_transactions_newest_first() {
    let server = create_populated_test_server();
    let response = server.get("/transactions").await;

    response.assert_status_ok();
    let body: ApiResponse<Vec<Transaction>> = response.json();
    let rows = body.data.unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows.windows(2).all(|w| w[0].date >= w[1].date));
}

#[tokio::test]
async fn test_list_transactions_with_filters() {
    let server = create_populated_test_server();

    let response = server
        .get("/transactions")
        .add_query_param("search", "groceries")
        .await;
    let rows = response.json::<ApiResponse<Vec<Transaction>>>().data.unwrap();
    assert_eq!(rows.len(), 2);

    let response = server
        .get("/transactions")
        .add_query_param("type", "income")
        .await;
    let rows = response.json::<ApiResponse<Vec<Transaction>>>().data.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].description, "Salary");

    let response = server
        .get("/transactions")
        .add_query_param("since", "2026-10-01")
        .add_query_param("limit", "2")
        .await;
    let rows = response.json::<ApiResponse<Vec<Transaction>>>().data.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].description, "Train pass");
}

// =============================================================================
// BUDGETS
// =============================================================================

#[tokio::test]
async fn test_create_budget_and_status() {
    let server = create_populated_test_server();

    let response = server
        .post("/budgets")
        .json(&json!({ "category": "Food & Dining", "amount": "400", "month": "2026-10" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let budget = response.json::<ApiResponse<Budget>>().data.unwrap();
    assert_eq!(budget.amount, Money::from_cents(40_000));

    let response = server
        .get("/budgets/status")
        .add_query_param("month", "2026-10")
        .await;
    response.assert_status_ok();
    let overview = response.json::<ApiResponse<BudgetOverview>>().data.unwrap();
    assert_eq!(overview.statuses.len(), 1);
    let status = &overview.statuses[0];
    assert_eq!(status.spent, Money::from_cents(30_000));
    assert_eq!(status.remaining, Money::from_cents(10_000));
    assert!(!status.over_budget);
}

#[tokio::test]
async fn test_duplicate_budget_conflicts() {
    let server = create_test_server();
    let body = json!({ "category": "Travel", "amount": "900", "month": "2026-10" });

    server
        .post("/budgets")
        .json(&body)
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post("/budgets")
        .json(&body)
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_budget_validation() {
    let server = create_test_server();

    server
        .post("/budgets")
        .json(&json!({ "category": "Income", "amount": "100", "month": "2026-10" }))
        .await
        .assert_status_bad_request();
    server
        .post("/budgets")
        .json(&json!({ "category": "Travel", "amount": "100", "month": "2026-13" }))
        .await
        .assert_status_bad_request();
    server
        .post("/budgets")
        .json(&json!({ "category": "Travel", "amount": "-1", "month": "2026-10" }))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_update_and_delete_budget() {
    let server = create_test_server();
    let budget = server
        .post("/budgets")
        .json(&json!({ "category": "Shopping", "amount": "150", "month": "2026-10" }))
        .await
        .json::<ApiResponse<Budget>>()
        .data
        .unwrap();

    let response = server
        .put(&format!("/budgets/{}", budget.id.0))
        .json(&json!({ "amount": "175.25" }))
        .await;
    response.assert_status_ok();
    let updated = response.json::<ApiResponse<Budget>>().data.unwrap();
    assert_eq!(updated.amount, Money::from_cents(17_525));
    assert_eq!(updated.period, budget.period);

    server
        .delete(&format!("/budgets/{}", budget.id.0))
        .await
        .assert_status_ok();
    server
        .delete(&format!("/budgets/{}", budget.id.0))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_list_budgets_by_month() {
    let server = create_test_server();
    for month in ["2026-09", "2026-10"] {
        server
            .post("/budgets")
            .json(&json!({ "category": "Travel", "amount": "100", "month": month }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let all = server.get("/budgets").await.json::<ApiResponse<Vec<Budget>>>();
    assert_eq!(all.data.unwrap().len(), 2);

    let october = server
        .get("/budgets")
        .add_query_param("month", "2026-10")
        .await
        .json::<ApiResponse<Vec<Budget>>>();
    assert_eq!(october.data.unwrap().len(), 1);
}

// =============================================================================
// REPORTS
// =============================================================================

#[tokio::test]
async fn test_summary_for_month() {
    let server = create_populated_test_server();
    let response = server
        .get("/summary")
        .add_query_param("month", "2026-10")
        .await;

    response.assert_status_ok();
    let summary = response.json::<ApiResponse<Summary>>().data.unwrap();
    assert_eq!(summary.label, "October 2026");
    assert_eq!(summary.totals.income, Money::from_cents(300_000));
    assert_eq!(summary.totals.expenses, Money::from_cents(45_000));
    assert_eq!(summary.totals.net, Money::from_cents(255_000));
    assert_eq!(summary.top_category.unwrap().category, "Food & Dining");
    assert_eq!(summary.recent.len(), 3);
}

#[tokio::test]
async fn test_summary_rejects_bad_month() {
    let server = create_test_server();
    server
        .get("/summary")
        .add_query_param("month", "October")
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_charts_series() {
    let server = create_populated_test_server();
    let response = server
        .get("/charts")
        .add_query_param("month", "2026-10")
        .await;

    response.assert_status_ok();
    let charts = response.json::<ApiResponse<Charts>>().data.unwrap();
    assert_eq!(charts.monthly.len(), 2);
    assert_eq!(charts.monthly[0].label, "Sep 2026");
    assert_eq!(charts.categories[0].category, "Food & Dining");
    assert_eq!(charts.categories[0].amount, Money::from_cents(50_000));
    assert!(charts.budgets.is_empty());
}

#[tokio::test]
async fn test_insights_messages() {
    let server = create_populated_test_server();
    let response = server
        .get("/insights")
        .add_query_param("month", "2026-10")
        .await;

    response.assert_status_ok();
    let insights = response.json::<ApiResponse<Insights>>().data.unwrap();
    assert_eq!(
        insights.savings_message,
        "You saved 85% of your income this month."
    );
    assert_eq!(insights.spending_trend, "Spending is up 125% from last month.");
    assert_eq!(
        insights.budget_health,
        "Set budgets to track your spending health."
    );
}

#[tokio::test]
async fn test_categories_endpoint() {
    let server = create_test_server();
    let response = server.get("/categories").await;

    response.assert_status_ok();
    let categories = response.json::<ApiResponse<Vec<Category>>>().data.unwrap();
    assert_eq!(categories.len(), 10);
    assert_eq!(categories[0].name, "Food & Dining");
}
