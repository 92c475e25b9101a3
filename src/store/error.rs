//! Error types for the spec/result storage layer.

use std::fmt;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    ConnectionFailed(String),
    QueryFailed(String),
    MigrationFailed(String),
    SerializationError(String),
    NotFound(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::ConnectionFailed(msg) => write!(f, "failed to connect to store: {msg}"),
            StoreError::QueryFailed(msg) => write!(f, "store query failed: {msg}"),
            StoreError::MigrationFailed(msg) => write!(f, "store migration failed: {msg}"),
            StoreError::SerializationError(msg) => write!(f, "serialization error: {msg}"),
            StoreError::NotFound(msg) => write!(f, "not found: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(feature = "storage-sqlite")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("no matching row".to_string()),
            other => StoreError::QueryFailed(other.to_string()),
        }
    }
}

#[cfg(feature = "storage-sqlite")]
impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}
