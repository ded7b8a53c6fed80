//! Error types for lunacy-core
//!
//! This module provides error handling for the ledger pipeline, including
//! error codes, detailed messages, and suggestions.

use lunacy_feed::FeedError;
use thiserror::Error;
use serde::{Deserialize, Serialize};

/// Stable codes carried in API error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    FeedUnavailable,
    InvalidFeed,
    TransactionNotFound,
    InvalidTableState,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::FeedUnavailable => "FEED_UNAVAILABLE",
            ErrorCode::InvalidFeed => "INVALID_FEED",
            ErrorCode::TransactionNotFound => "TRANSACTION_NOT_FOUND",
            ErrorCode::InvalidTableState => "INVALID_TABLE_STATE",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error body sent to JSON API clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

/// Main error type for lunacy-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Feed unavailable from {origin}: {message}")]
    FeedUnavailable { origin: String, message: String },

    #[error("Invalid feed: {} violation(s)", .violations.len())]
    InvalidFeed { violations: Vec<String> },

    #[error("Transaction not found: {id}")]
    TransactionNotFound { id: String },

    #[error("Invalid table state: {message}")]
    InvalidTableState { message: String },
}

impl CoreError {
    /// Map a fetcher error, naming where the feed came from
    pub fn from_feed(error: FeedError, origin: &str) -> Self {
        match error {
            FeedError::Schema(schema) => CoreError::InvalidFeed {
                violations: schema.violations.iter().map(|v| v.to_string()).collect(),
            },
            other => CoreError::FeedUnavailable {
                origin: origin.to_string(),
                message: other.to_string(),
            },
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::FeedUnavailable { .. } => ErrorCode::FeedUnavailable,
            CoreError::InvalidFeed { .. } => ErrorCode::InvalidFeed,
            CoreError::TransactionNotFound { .. } => ErrorCode::TransactionNotFound,
            CoreError::InvalidTableState { .. } => ErrorCode::InvalidTableState,
        }
    }

    /// Level the error is logged at
    pub fn log_level(&self) -> log::Level {
        match self {
            CoreError::FeedUnavailable { .. } | CoreError::InvalidFeed { .. } => log::Level::Error,
            CoreError::TransactionNotFound { .. } => log::Level::Info,
            CoreError::InvalidTableState { .. } => log::Level::Warn,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::FeedUnavailable { origin, .. } => {
                details = details.with_suggestion(format!(
                    "Check that '{}' exists and is reachable.", origin
                ));
                details = details.with_suggestion(
                    "Ensure the document is valid JSON.".to_string()
                );
            }
            CoreError::InvalidFeed { violations } => {
                details = details.with_detail(serde_json::json!({ "violations": violations }));
                details = details.with_suggestion(
                    "Every record needs activity_id, date, type, amount, balance, source.description and destination.description.".to_string()
                );
            }
            CoreError::TransactionNotFound { .. } => {
                details = details.with_suggestion(
                    "Use the /api/transactions endpoint to list all transactions.".to_string()
                );
            }
            CoreError::InvalidTableState { message } => {
                details = details.with_detail(serde_json::json!({ "table_message": message }));
            }
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            data: serde_json::json!({}),
        }
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);
    /// Log debug information
    fn log_debug(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        log::log!(
            target: "lunacy::error",
            error.log_level(),
            "[{}] {} - Operation: {} - Data: {}",
            error.code(),
            error,
            context.operation,
            context.data
        );
        if let CoreError::InvalidFeed { violations } = error {
            for violation in violations {
                log::debug!(target: "lunacy::error", "  {}", violation);
            }
        }
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "lunacy::error",
            "WARNING: {} - Operation: {} - Data: {}",
            message,
            context.operation,
            context.data
        );
    }

    fn log_debug(&self, message: &str, context: &ErrorContext) {
        log::debug!(
            target: "lunacy::error",
            "DEBUG: {} - Operation: {} - Data: {}",
            message,
            context.operation,
            context.data
        );
    }
}

// ==================== Tests ====================
