//! Error types for imgstation.

use thiserror::Error;

/// Common error type for imgstation.
#[derive(Error, Debug)]
pub enum StationError {
    /// Database error.
    ///
    /// Errors from sqlx are converted automatically; unique constraint
    /// violations become [`StationError::Conflict`] instead.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Permission denied error.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Resource already exists.
    #[error("{0} already exists")]
    Conflict(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for StationError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return StationError::Conflict(db_err.message().to_string());
            }
        }
        StationError::Database(e.to_string())
    }
}

/// Result type alias for imgstation operations.
pub type Result<T> = std::result::Result<T, StationError>;
