//! Error types shared by the Linka services

use std::time::Duration;

use thiserror::Error;

/// Result alias used across the Linka crates
pub type Result<T> = std::result::Result<T, Error>;

/// Failures while reading the external stores or handling a request
#[derive(Error, Debug)]
pub enum Error {
    /// Store query or connection failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Config file could not be read, parsed or validated
    #[error("Configuration error: {0}")]
    Config(String),

    /// An external read was abandoned after its single attempt
    #[error("Timed out: {operation} after {after:?}")]
    Timeout {
        operation: String,
        after: Duration,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for failures caused by the caller rather than a store
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}
