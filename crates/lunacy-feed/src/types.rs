//! Feed record types: the raw shape as fetched and the flat display shape

use serde::{Deserialize, Serialize};

/// Top-level feed document: `{ "transactions": [...] }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFeed {
    /// Absent and `null` both mean "no records"
    #[serde(default)]
    pub transactions: Option<Vec<RawTransaction>>,
}

impl RawFeed {
    /// Records in feed order, empty when the array is missing
    pub fn records(&self) -> &[RawTransaction] {
        self.transactions.as_deref().unwrap_or(&[])
    }
}

/// Nested counterparty object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub description: String,
}

/// A transaction record exactly as the feed supplies it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub activity_id: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub method: Option<String>,
    pub amount: f64,
    pub balance: f64,
    pub source: Party,
    pub destination: Party,
}

/// Display-ready transaction row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "txID")]
    pub tx_id: String,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub amount: f64,
    pub balance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}
