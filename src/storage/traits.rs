//! Storage traits and error types
//!
//! This module defines the trait interface for document stores and
//! associated error types.

use crate::document::Document;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Checkpoint {path} is not a valid document array: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to encode documents: {0}")]
    Encode(serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for document store implementations
///
/// A store holds one full snapshot of the document set. Every save replaces
/// the previous snapshot entirely.
pub trait DocumentStore {
    /// Loads the stored snapshot
    ///
    /// # Returns
    ///
    /// * `Ok(Some(documents))` - A snapshot exists
    /// * `Ok(None)` - Nothing has been stored yet
    /// * `Err(StorageError::Decode)` - The snapshot exists but cannot be decoded
    fn load(&self) -> StorageResult<Option<Vec<Document>>>;

    /// Replaces the stored snapshot with `documents`
    fn save(&self, documents: &[Document]) -> StorageResult<()>;

    /// Human-readable location of the store, for log messages
    fn location(&self) -> String;
}
