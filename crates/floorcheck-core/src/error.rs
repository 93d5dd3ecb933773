use std::io;

use thiserror::Error;

use crate::config::ConfigError;

/// Failures of the persistence layer. The store turns any of these into a
/// switch to memory-only mode; they never reach the aggregation logic.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("record version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("record belongs to namespace `{found}`, expected `{expected}`")]
    NamespaceMismatch { expected: String, found: String },

    #[error("storage quota exceeded: {needed} bytes needed, {available} available")]
    QuotaExceeded { needed: usize, available: usize },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session config: {0:?}")]
    InvalidConfig(Vec<ConfigError>),

    #[error("unknown room `{0}`")]
    UnknownRoom(String),

    #[error("unknown day `{0}`")]
    UnknownDay(String),

    #[error("room `{room}` has no item `{item}` for {day}")]
    UnknownItem {
        room: String,
        day: String,
        item: String,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}
