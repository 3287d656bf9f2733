//! Error types and error handling for the Hister search core.
//!
//! This module defines the error types used throughout the
//! application. Errors fall into a few families that callers treat
//! differently: input rejections, policy rejections (sensitive
//! content, skip rules), extraction failures, backend failures and
//! best-effort failures such as favicon downloads.

use thiserror::Error;

/// Result type alias for Hister operations
pub type Result<T> = std::result::Result<T, HisterError>;

/// Main error type for the Hister search core
#[derive(Error, Debug)]
pub enum HisterError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Document contains sensitive data (matched: {})", .patterns.join(", "))]
    SensitiveContent { patterns: Vec<String> },

    #[error("URL matches a skip rule: {0}")]
    Skipped(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Query syntax error: {0}")]
    QuerySyntax(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Search failed: {0}")]
    SearchFailed(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Favicon download failed: {0}")]
    FaviconFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl HisterError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Policy rejections are expected outcomes, not failures.
    ///
    /// Reindex counts them as skipped documents instead of aborting.
    pub fn is_policy_rejection(&self) -> bool {
        matches!(
            self,
            HisterError::SensitiveContent { .. } | HisterError::Skipped(_)
        )
    }
}
