//! Error types for lunacy-feed

use thiserror::Error;

/// One structural mismatch found by the schema validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Location inside the document, e.g. `transactions[3].source.description`
    pub path: String,
    /// Expected JSON type
    pub expected: String,
    /// JSON type actually found (`missing` when absent)
    pub found: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: expected {}, found {}", self.path, self.expected, self.found)
    }
}

/// Validation failure listing every violated field
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{} schema violation(s): {}", .violations.len(), summary(.violations))]
pub struct SchemaError {
    pub violations: Vec<Violation>,
}

fn summary(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("IO error reading {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error fetching {url}: {message}")]
    Http { url: String, message: String },

    #[error("Invalid JSON from {origin}: {message}")]
    InvalidJson { origin: String, message: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
