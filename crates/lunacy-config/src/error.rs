//! Error types for lunacy-config

use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Could not read {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    /// A missing file is recoverable: the server runs on defaults
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ConfigError::FileNotFound { .. })
    }

    /// Hints printed next to the error at startup
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            ConfigError::FileNotFound { .. } => vec![
                "Use --config to point at another file.".to_string(),
                "Run with --print-default-config to get a starting file.".to_string(),
            ],
            ConfigError::Read { .. } => vec!["Check the file permissions.".to_string()],
            ConfigError::InvalidYaml(_) => {
                vec!["Compare the file against --print-default-config output.".to_string()]
            }
            ConfigError::InvalidValue { field, .. } => vec![format!("Fix or remove `{}`.", field)],
        }
    }
}

/// Result type with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
