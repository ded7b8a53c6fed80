//! Ledger page rendering - Full page endpoint
//!
//! The shell paints a skeleton table and a balance spinner, then htmx
//! fills both: the table immediately, the balance after the configured delay.

use super::render::{render_balance_spinner, render_skeleton_table, TABLE_ROUTE};
use crate::AppState;
use axum::extract::{RawQuery, State};
use axum::http::HeaderMap;
use axum::response::Html;
use lunacy_utils::escape_html;

/// Ledger page - balance header and transactions table
pub async fn page_ledger(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Html<String> {
    let table_state = state.ledger.table_state(query.as_deref().unwrap_or(""));
    let table_url = format!("{}?{}", TABLE_ROUTE, table_state.to_query());

    let inner_content = format!(
        r#"<div class='mx-auto max-w-6xl'>
            <div class='mb-6 flex items-end justify-between'>
                <div>
                    <p class='text-sm text-gray-500 dark:text-gray-400'>{}</p>
                    <h2 class='text-2xl font-bold'>Balance</h2>
                </div>
                <div id='balance' hx-get='/ledger/balance' hx-trigger='load delay:{}ms' hx-swap='innerHTML'>{}</div>
            </div>
            <h2 class='mb-2 text-xl font-bold'>Your Transactions</h2>
            <div id='ledger-table' hx-get='{}' hx-trigger='load' hx-swap='innerHTML'>{}</div>
        </div>"#,
        escape_html(&state.config.display.account_title),
        state.config.display.balance_reveal_delay_ms,
        render_balance_spinner(),
        escape_html(&table_url),
        render_skeleton_table(&table_state)
    );

    Html(crate::page_response(&headers, "Transactions", &inner_content, &state.config))
}
