//! Error types for the bento application layer
//!
//! Application-level errors that wrap board errors and add app-specific variants.

use bento::error::BoardError;
use thiserror::Error;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Board(#[from] BoardError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Controller channel closed")]
    ChannelClosed,

    /// A command failed inside the controller
    #[error("{0}")]
    Command(String),

    #[error("Controller thread error: {0}")]
    Thread(String),
}

impl<T> From<crossbeam_channel::SendError<T>> for AppError {
    fn from(_: crossbeam_channel::SendError<T>) -> Self {
        AppError::ChannelClosed
    }
}

/// Result type alias for the application layer
pub type Result<T> = std::result::Result<T, AppError>;
