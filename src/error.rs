//! Storage error type shared by the store and the controller.

use thiserror::Error;

/// Failure of the underlying task store.
///
/// This is the only error kind the core produces. Validation problems (blank
/// text, unknown ids) are handled silently and never show up here.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] refinery::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A previous holder of the connection panicked.
    #[error("database connection lock poisoned")]
    Poisoned,

    /// The background worker running a store call panicked or was aborted.
    #[error("storage worker failed: {0}")]
    WorkerFailed(String),
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(err: tokio::task::JoinError) -> Self {
        StorageError::WorkerFailed(err.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StorageError>;
