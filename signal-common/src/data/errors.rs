// =================================================================
// data/errors.rs - Storage Error Types
// =================================================================

use thiserror::Error;

/// Errors raised by the storage collaborators
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

pub type DataResult<T> = Result<T, DataError>;
