//! Common error types for OpenMusic

use thiserror::Error;

/// Common result type for OpenMusic operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by stores and services
///
/// `NotFound`, `Authorization` and `Invariant` are client failures; every
/// other variant is a server fault.
#[derive(Error, Debug)]
pub enum Error {
    /// Referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Caller lacks permission on an existing entity
    #[error("{0}")]
    Authorization(String),

    /// A write did not take effect or a required linkage is missing
    #[error("{0}")]
    Invariant(String),

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    pub fn authorization(msg: impl Into<String>) -> Self {
        Error::Authorization(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Error::Invariant(msg.into())
    }

    /// True for failures caused by the request rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::Authorization(_) | Error::Invariant(_)
        )
    }
}
