// src/error.rs

use crate::models::{CollectionId, ItemIndex};
use thiserror::Error;

/// Errors surfaced by the scheduler and the study session.
///
/// Both variants of the "not found" class are recoverable: the caller should
/// `initialize` the collection (or grow it) and retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Collection not found: {0}")]
    CollectionNotFound(CollectionId),

    #[error("Item {index} not found in collection {collection}")]
    ItemNotFound {
        collection: CollectionId,
        index: ItemIndex,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SchedulerError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SchedulerError::CollectionNotFound(_) | SchedulerError::ItemNotFound { .. }
        )
    }
}

/// Failures of the key-value persistence layer. These never cross into the
/// scheduler's interface; `Persistence` logs and absorbs them.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
