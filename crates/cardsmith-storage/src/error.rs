//! Storage failures.
//!
//! Everything the store can fail at: SQLite itself, the JSON payloads saved
//! alongside recipients, filesystem setup for the default database path, and
//! lookups that come back empty.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A recipient or card payload failed to (de)serialize.
    #[error("payload error: {0}")]
    Json(#[from] serde_json::Error),

    /// Creating the app-data directory for the default database path failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),

    /// The platform gave us no usable app-data location.
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;
