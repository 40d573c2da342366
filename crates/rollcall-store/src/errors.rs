//! Error types for the store.

use rollcall_core::InvalidTableName;
use thiserror::Error;

/// Errors returned by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Which migration failed and why.
        message: String,
    },

    /// A stored conversation ID could not be parsed.
    #[error("invalid conversation id in store: {0:?}")]
    InvalidIdentifier(String),

    /// An allow-list table name failed validation.
    #[error(transparent)]
    InvalidTable(#[from] InvalidTableName),
}

/// Convenience alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;
