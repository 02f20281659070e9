use rusqlite::Error as RusqliteError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SomanaError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] RusqliteError),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A list query that cannot be turned into a query descriptor
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A create request whose body fails the entity's rules
    #[error("{0}")]
    ValidationError(String),

    /// A create request colliding with a unique attribute
    #[error("{0}")]
    Conflict(String),

    #[error("Error: {0}")]
    Error(String),
}

impl SomanaError {
    /// True for errors caused by the client's input rather than by execution
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SomanaError::InvalidQuery(_) | SomanaError::ValidationError(_) | SomanaError::Conflict(_)
        )
    }
}
