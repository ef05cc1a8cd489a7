//! Error types for the bento board
//!
//! Centralized error handling using thiserror. Policy outcomes (blank names,
//! dangling ids, malformed lists) are not errors; they are handled in place.

use thiserror::Error;

/// Main error type for the board store
#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Failed to parse stored value '{key}': {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Cannot delete the last dashboard")]
    LastDashboard,

    #[error("Drag session no longer matches the list (expected {expected} items, found {found})")]
    StaleDrag { expected: usize, found: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for the board store
pub type Result<T> = std::result::Result<T, BoardError>;
