//! Feed to display rows: flatten, deduplicate, aggregate

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use lunacy_feed::{RawFeed, RawTransaction, Transaction};
use serde::Serialize;
use std::collections::HashSet;

/// Shown in place of a timestamp that cannot be parsed
pub const INVALID_DATE: &str = "Invalid Date";

/// Result of running one fetched feed through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSnapshot {
    /// Display rows, one per distinct txID, in first-appearance order
    pub transactions: Vec<Transaction>,
    /// Sum of `amount` over the deduplicated rows
    pub total_balance: f64,
    /// Record count before deduplication
    pub raw_count: usize,
    /// Records dropped as repeats of an earlier txID
    pub duplicate_count: usize,
    /// Running balance reported by the last distinct row, if any
    pub feed_balance: Option<f64>,
}

impl LedgerSnapshot {
    /// Look a row up by its identifier
    pub fn transaction(&self, tx_id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.tx_id == tx_id)
    }

    /// True when the computed total and the feed's running balance disagree
    pub fn balance_mismatch(&self) -> bool {
        match self.feed_balance {
            Some(feed) => (feed - self.total_balance).abs() > 0.005,
            None => false,
        }
    }
}

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse a feed date; values without an offset are taken as UTC
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Render a feed date as a UTC string, e.g. `Tue, 14 Mar 2023 10:00:00 GMT`
pub fn format_timestamp(value: &str) -> String {
    match parse_timestamp(value) {
        Some(dt) => dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
        None => INVALID_DATE.to_string(),
    }
}

/// Map one feed record to a display row
pub fn flatten(record: &RawTransaction) -> Transaction {
    Transaction {
        tx_id: record.activity_id.clone(),
        timestamp: format_timestamp(&record.date),
        kind: record.kind.clone(),
        method: record.method.clone(),
        amount: record.amount,
        balance: record.balance,
        source: Some(record.source.description.clone()),
        destination: Some(record.destination.description.clone()),
    }
}

/// Keep the first row for every txID, preserving first-appearance order
pub fn dedupe(rows: Vec<Transaction>) -> Vec<Transaction> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|tx| seen.insert(tx.tx_id.clone()))
        .collect()
}

/// Sum of `amount` across rows; `0.0` when empty
pub fn aggregate_balance(rows: &[Transaction]) -> f64 {
    rows.iter().map(|tx| tx.amount).sum()
}

/// Run a validated feed through flatten, dedupe and aggregate
pub fn transform_feed(feed: &RawFeed) -> LedgerSnapshot {
    let records = feed.records();
    let flat: Vec<Transaction> = records.iter().map(flatten).collect();
    let transactions = dedupe(flat);
    let total_balance = aggregate_balance(&transactions);

    LedgerSnapshot {
        raw_count: records.len(),
        duplicate_count: records.len() - transactions.len(),
        feed_balance: transactions.last().map(|tx| tx.balance),
        total_balance,
        transactions,
    }
}
