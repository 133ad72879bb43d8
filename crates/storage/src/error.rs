//! Storage-specific errors.

use thiserror::Error;

/// Result type alias using `StorageError`.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types.
#[derive(Error, Debug)]
pub enum StorageError {
    /// A write would duplicate an email that another row already holds.
    #[error("email already in use: {email}")]
    EmailTaken {
        /// The offending email value.
        email: String,
    },

    /// Database error from `SQLx`.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}
