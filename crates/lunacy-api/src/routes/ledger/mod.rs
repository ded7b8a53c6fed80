//! Ledger routes - balance header and transactions table
//!
//! Structure:
//! - api.rs: JSON API and HTMX fragment endpoints
//! - page.rs: Full page rendering
//! - render.rs: Table, toolbar and pagination markup

pub mod api;
pub mod page;
pub mod render;

pub use api::{
    api_balance,
    api_summary,
    api_transaction_detail,
    api_transactions,
    htmx_ledger_balance,
    htmx_ledger_table,
};

pub use page::page_ledger;
