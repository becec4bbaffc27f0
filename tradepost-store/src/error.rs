//! Error types for the flat-file store.

use thiserror::Error;

/// Store-level errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying file I/O failure.
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure.
    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Attempted to add a product under a taken name.
    #[error("product already exists: {0}")]
    ProductExists(String),

    /// No product under this name.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// Attempted to add a category under a taken name.
    #[error("category already exists: {0}")]
    CategoryExists(String),

    /// No category under this name.
    #[error("category not found: {0}")]
    CategoryNotFound(String),

    /// Attempted to add an account for a known user.
    #[error("account already exists: {0}")]
    AccountExists(String),

    /// No account for this user.
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// Warning position out of range (positions are 1-based).
    #[error("invalid warning index {index}, user has {count} warning(s)")]
    InvalidWarningIndex { index: usize, count: usize },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
