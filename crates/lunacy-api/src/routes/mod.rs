//! Route modules for the API server
//!
//! - ledger: Ledger page, table and balance fragments, JSON API
//! - settings: Current configuration
//! - data: The static feed document

pub mod data;
pub mod ledger;
pub mod settings;
