//! Ledger API endpoints - JSON API and HTMX partial responses
//!
//! Endpoints:
//! - api_transactions: Filtered, sorted page of transactions (JSON)
//! - api_transaction_detail: Single transaction by txID (JSON)
//! - api_balance: Aggregate balance (JSON)
//! - api_summary: Counts from the last successful load (JSON)
//! - htmx_ledger_table: Table fragment for the current table state
//! - htmx_ledger_balance: Balance fragment for the delayed reveal

use super::render::{render_balance, render_balance_error, render_table};
use crate::{ApiError, AppState};
use axum::extract::{Path, RawQuery, State};
use axum::response::Html;
use axum::Json;
use lunacy_core::{BalanceResponse, LedgerSummary, TableModel, TransactionsResponse};
use lunacy_feed::Transaction;

/// Transactions with the table state from the query string applied (JSON API)
///
/// An unsupported `size` is a 400 here; the HTML table falls back to the default.
pub async fn api_transactions(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<TransactionsResponse>, ApiError> {
    let table_state = state.ledger.try_table_state(query.as_deref().unwrap_or(""))?;
    let snapshot = state.ledger.snapshot().await?;
    let view = TableModel::build(&snapshot.transactions, &table_state);
    Ok(Json(TransactionsResponse::new(&view, &snapshot)))
}

/// Single deduplicated transaction (JSON API)
pub async fn api_transaction_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Transaction>, ApiError> {
    let transaction = state.ledger.transaction(&id).await?;
    Ok(Json(transaction))
}

/// Aggregate balance (JSON API)
pub async fn api_balance(State(state): State<AppState>) -> Result<Json<BalanceResponse>, ApiError> {
    let snapshot = state.ledger.snapshot().await?;
    Ok(Json(BalanceResponse::from(&snapshot)))
}

/// Summary of the last successful load, `null` before the first one
pub async fn api_summary(State(state): State<AppState>) -> Json<Option<LedgerSummary>> {
    Json(state.ledger.last_summary())
}

/// Table fragment - fetches the feed fresh and renders the requested state
///
/// A failed fetch renders the error banner above an empty table.
pub async fn htmx_ledger_table(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Html<String> {
    let table_state = state.ledger.table_state(query.as_deref().unwrap_or(""));
    let page_sizes = &state.config.pagination.page_size_options;

    let html = match state.ledger.snapshot().await {
        Ok(snapshot) => {
            let view = TableModel::build(&snapshot.transactions, &table_state);
            render_table(&view, page_sizes, None)
        }
        Err(e) => {
            let view = TableModel::build(&[], &table_state);
            render_table(&view, page_sizes, Some(&e))
        }
    };

    Html(html)
}

/// Balance fragment for the delayed reveal
pub async fn htmx_ledger_balance(State(state): State<AppState>) -> Html<String> {
    match state.ledger.snapshot().await {
        Ok(snapshot) => Html(render_balance(snapshot.total_balance)),
        Err(_) => Html(render_balance_error()),
    }
}
