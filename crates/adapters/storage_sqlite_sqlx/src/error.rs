//! Storage-specific error type wrapping sqlx errors.

use userbook_domain::error::{StorageFailure, UserbookError};

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to encode or decode the stored field set.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StorageError {
    /// Native `SQLite` result code, when the driver reported one.
    fn code(&self) -> Option<String> {
        match self {
            Self::Database(sqlx::Error::Database(db)) => db.code().map(|code| code.into_owned()),
            _ => None,
        }
    }
}

impl From<StorageError> for UserbookError {
    fn from(err: StorageError) -> Self {
        let code = err.code();
        let failure = StorageFailure::new(err);
        Self::Storage(match code {
            Some(code) => failure.with_code(code),
            None => failure,
        })
    }
}
