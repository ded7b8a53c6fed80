//! Configuration management for lunacy
//!
//! This module handles loading, validation, and management of
//! lunacy configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::{ConfigError, ConfigResult};

/// Page sizes offered by the table page-size selector
pub const PAGE_SIZE_OPTIONS: [usize; 5] = [10, 20, 30, 40, 50];

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// Feed location configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the static feed document
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    /// Feed file name, also served at `/data/<feed_file>`
    #[serde(default = "default_feed_file")]
    pub feed_file: String,
    /// Remote feed URL; when set it replaces the local file
    #[serde(default)]
    pub feed_url: Option<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            feed_file: default_feed_file(),
            feed_url: None,
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data")
}

fn default_feed_file() -> String {
    "complicated-ledger.json".to_string()
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Rows per page on first render
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    /// Choices offered by the page-size selector
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<usize>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            page_size_options: default_page_size_options(),
        }
    }
}

fn default_page_size() -> usize {
    10
}

fn default_page_size_options() -> Vec<usize> {
    PAGE_SIZE_OPTIONS.to_vec()
}

/// Display settings for the ledger page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Delay before the balance replaces its spinner
    #[serde(default = "default_reveal_delay")]
    pub balance_reveal_delay_ms: u64,
    /// Theme used until the visitor picks one
    #[serde(default)]
    pub default_theme: Theme,
    /// Caption shown next to the balance
    #[serde(default = "default_account_title")]
    pub account_title: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            balance_reveal_delay_ms: default_reveal_delay(),
            default_theme: Theme::default(),
            account_title: default_account_title(),
        }
    }
}

fn default_reveal_delay() -> u64 {
    1000
}

fn default_account_title() -> String {
    "Investing Account".to_string()
}

/// Color theme preference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Follow the operating system
    System,
    Light,
    Dark,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::System
    }
}

impl std::str::FromStr for Theme {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(Theme::System),
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(format!("Invalid theme: {}", s)),
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::System => write!(f, "system"),
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Feed location
    #[serde(default)]
    pub data: DataConfig,
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Display settings
    #[serde(default)]
    pub display: DisplayConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.to_string_lossy().to_string(),
            source,
        })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.data.feed_file.is_empty() || self.data.feed_file.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue {
                field: "data.feed_file".to_string(),
                reason: "Feed file must be a plain file name".to_string(),
            });
        }

        if self.pagination.page_size_options.is_empty()
            || self.pagination.page_size_options.contains(&0)
        {
            return Err(ConfigError::InvalidValue {
                field: "pagination.page_size_options".to_string(),
                reason: "Page size options must be non-empty and positive".to_string(),
            });
        }

        if !self.pagination.page_size_options.contains(&self.pagination.default_page_size) {
            return Err(ConfigError::InvalidValue {
                field: "pagination.default_page_size".to_string(),
                reason: "Default page size must be one of the page size options".to_string(),
            });
        }

        if self.display.balance_reveal_delay_ms > 60_000 {
            return Err(ConfigError::InvalidValue {
                field: "display.balance_reveal_delay_ms".to_string(),
                reason: "Reveal delay must be at most 60000 ms".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Get the full path to the local feed document
    pub fn feed_path(&self) -> PathBuf {
        self.data.path.join(&self.data.feed_file)
    }

    /// Relative URL the feed document is served under
    pub fn feed_route(&self) -> String {
        format!("/data/{}", self.data.feed_file)
    }
}
