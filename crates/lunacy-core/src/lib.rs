//! Core ledger pipeline and table model
//!
//! `Ledger` wraps a feed fetcher. Every snapshot goes back to the feed,
//! validates it, and runs it through the transform; the only state kept
//! between requests is a small summary of the last successful load.

use lunacy_config::Config;
use lunacy_feed::{FetcherRef, FileFeedFetcher, HttpFeedFetcher, Transaction};
use serde::Serialize;
use std::sync::{Arc, RwLock};

pub mod columns;
pub mod error;
pub mod table;
pub mod transform;

pub use columns::{cell_value, column_def, columns, CellKind, ColumnDef, ColumnId, FilterKind, HeaderKind};
pub use error::{CoreError, CoreResult, DefaultErrorLogger, ErrorCode, ErrorContext, ErrorDetails, ErrorLogger};
pub use table::{compare_alphanumeric, parse_query, SortState, TableModel, TableState, TableView, TransactionType};
pub use transform::{aggregate_balance, dedupe, flatten, format_timestamp, transform_feed, LedgerSnapshot};

/// Counts from the most recent successful load
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub transaction_count: usize,
    pub duplicate_count: usize,
    pub total_balance: f64,
    pub feed_balance: Option<f64>,
    pub source: String,
}

/// Transactions list response
#[derive(Debug, Clone, Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
    pub total_count: usize,
    pub filtered_count: usize,
    /// 1-based
    pub page: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub total_balance: f64,
}

impl TransactionsResponse {
    pub fn new(view: &TableView<'_>, snapshot: &LedgerSnapshot) -> Self {
        Self {
            transactions: view.rows.iter().map(|tx| (*tx).clone()).collect(),
            total_count: view.total_count,
            filtered_count: view.filtered_count,
            page: view.state.page_index + 1,
            page_size: view.state.page_size,
            page_count: view.page_count,
            total_balance: snapshot.total_balance,
        }
    }
}

/// Balance response
#[derive(Debug, Clone, Serialize)]
pub struct BalanceResponse {
    pub total_balance: f64,
    pub feed_balance: Option<f64>,
    pub transaction_count: usize,
    pub duplicate_count: usize,
}

impl From<&LedgerSnapshot> for BalanceResponse {
    fn from(snapshot: &LedgerSnapshot) -> Self {
        Self {
            total_balance: snapshot.total_balance,
            feed_balance: snapshot.feed_balance,
            transaction_count: snapshot.transactions.len(),
            duplicate_count: snapshot.duplicate_count,
        }
    }
}

pub struct Ledger {
    config: Config,
    fetcher: FetcherRef,
    last_summary: RwLock<Option<LedgerSummary>>,
    logger: Arc<dyn ErrorLogger>,
}

impl Ledger {
    pub fn new(config: Config, fetcher: FetcherRef) -> Self {
        Self {
            config,
            fetcher,
            last_summary: RwLock::new(None),
            logger: Arc::new(DefaultErrorLogger),
        }
    }

    /// Build a ledger reading from `data.feed_url` if set, else the local feed file
    pub fn from_config(config: Config) -> Result<Self, CoreError> {
        let fetcher: FetcherRef = match &config.data.feed_url {
            Some(url) => {
                let fetcher = HttpFeedFetcher::new(url.clone())
                    .map_err(|e| CoreError::from_feed(e, url))?;
                Arc::new(fetcher)
            }
            None => Arc::new(FileFeedFetcher::new(config.feed_path())),
        };
        log::info!("Ledger feed source: {}", fetcher.describe());

        let ledger = Self::new(config, fetcher);
        let feed_path = ledger.config.feed_path();
        if ledger.config.data.feed_url.is_none() && !feed_path.exists() {
            ledger.logger.log_warning(
                "feed file not found; table requests will fail until it exists",
                &ErrorContext::new("from_config")
                    .with_data("path", serde_json::json!(feed_path.to_string_lossy())),
            );
        }
        Ok(ledger)
    }

    pub fn with_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Where the feed comes from
    pub fn source(&self) -> String {
        self.fetcher.describe()
    }

    /// Decode table state from a query string using configured page sizes
    pub fn table_state(&self, query: &str) -> TableState {
        TableState::from_query(
            query,
            self.config.pagination.default_page_size,
            &self.config.pagination.page_size_options,
        )
    }

    /// Strict form of `table_state`: an unsupported page size is an error
    pub fn try_table_state(&self, query: &str) -> CoreResult<TableState> {
        TableState::try_from_query(
            query,
            self.config.pagination.default_page_size,
            &self.config.pagination.page_size_options,
        )
    }

    /// Fetch, validate and transform the feed
    pub async fn snapshot(&self) -> CoreResult<LedgerSnapshot> {
        let source = self.fetcher.describe();
        let context = ErrorContext::new("snapshot").with_data("source", serde_json::json!(source));

        let feed = match self.fetcher.fetch_feed().await {
            Ok(feed) => feed,
            Err(e) => {
                let error = CoreError::from_feed(e, &source);
                self.logger.log_error(&error, &context);
                return Err(error);
            }
        };

        let snapshot = transform_feed(&feed);

        if snapshot.duplicate_count > 0 {
            self.logger.log_debug(
                &format!("dropped {} duplicate record(s)", snapshot.duplicate_count),
                &context,
            );
        }
        if snapshot.balance_mismatch() {
            self.logger.log_debug(
                &format!(
                    "computed total {} differs from feed balance {:?}",
                    snapshot.total_balance, snapshot.feed_balance
                ),
                &context,
            );
        }

        let summary = LedgerSummary {
            transaction_count: snapshot.transactions.len(),
            duplicate_count: snapshot.duplicate_count,
            total_balance: snapshot.total_balance,
            feed_balance: snapshot.feed_balance,
            source,
        };
        // The summary is replaced wholesale, so a poisoned lock is safe to reuse
        let mut last = self
            .last_summary
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *last = Some(summary);

        Ok(snapshot)
    }

    /// One deduplicated transaction by txID
    pub async fn transaction(&self, tx_id: &str) -> CoreResult<Transaction> {
        let snapshot = self.snapshot().await?;
        snapshot
            .transaction(tx_id)
            .cloned()
            .ok_or_else(|| CoreError::TransactionNotFound { id: tx_id.to_string() })
    }

    pub fn last_summary(&self) -> Option<LedgerSummary> {
        self.last_summary
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
