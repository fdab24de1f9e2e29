use thiserror::Error;

/// Errors raised by the ticket stores and the seed reader.
#[derive(Error, Debug)]
pub enum PayoutError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
    #[cfg(feature = "storage-mysql")]
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type Result<T> = std::result::Result<T, PayoutError>;

/// Non-business failures reported by the payout engine.
///
/// Storage causes are logged where they happen and never carried here, so a
/// caller can only tell "bad request" from "try again later".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayoutFailure {
    #[error("malformed request: {0}")]
    MalformedInput(String),
    #[error("ticket store unavailable")]
    StorageUnavailable,
}
