//! Ledger feed fetching and schema validation
//!
//! The feed is a static JSON document `{ "transactions": [...] }`. A
//! fetcher retrieves it fresh on every call; the schema module checks the
//! document before anything downstream trusts its shape.

use async_trait::async_trait;
use std::sync::Arc;

pub mod error;
pub mod types;
pub mod schema;
pub mod fetcher;

pub use error::{FeedError, SchemaError, Violation};
pub use fetcher::{FileFeedFetcher, HttpFeedFetcher};
pub use schema::{validate_feed, validate_transaction};
pub use types::{Party, RawFeed, RawTransaction, Transaction};

// ==================== Fetcher Trait ====================

/// Fetcher reference type
pub type FetcherRef = Arc<dyn FeedFetcherTrait>;

/// Trait for feed sources
#[async_trait]
pub trait FeedFetcherTrait: Send + Sync {
    /// Read the raw document bytes, bypassing any cache
    async fn fetch_bytes(&self) -> Result<Vec<u8>, FeedError>;

    /// Human-readable origin for logs and error messages
    fn describe(&self) -> String;

    /// Fetch and parse the document as JSON
    async fn fetch(&self) -> Result<serde_json::Value, FeedError> {
        let bytes = self.fetch_bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| FeedError::InvalidJson {
            origin: self.describe(),
            message: e.to_string(),
        })
    }

    /// Fetch, parse and validate the document
    async fn fetch_feed(&self) -> Result<RawFeed, FeedError> {
        let value = self.fetch().await?;
        let feed = validate_feed(&value)?;
        log::debug!(
            "fetched {} record(s) from {}",
            feed.records().len(),
            self.describe()
        );
        Ok(feed)
    }
}
