//! Storage module for persisting harvested documents
//!
//! This module handles the checkpoint file, including:
//! - Loading the documents collected by earlier sessions
//! - Recovering from a missing or corrupt checkpoint
//! - Atomic full-snapshot rewrites

mod checkpoint;
mod traits;

pub use checkpoint::JsonCheckpointStore;
pub use traits::{DocumentStore, StorageError, StorageResult};

use crate::document::Document;

/// Loads the documents of earlier sessions from a store
///
/// A missing checkpoint and a checkpoint that cannot be decoded both yield an
/// empty document set; the latter is logged as a warning and will be
/// overwritten by the next save. Read failures other than a missing file are
/// returned, so an unreadable checkpoint is never clobbered.
///
/// # Arguments
///
/// * `store` - The store to load from
///
/// # Returns
///
/// * `Ok(Vec<Document>)` - Prior documents, possibly empty
/// * `Err(StorageError)` - The checkpoint exists but could not be read
pub fn load_prior_documents<S: DocumentStore + ?Sized>(store: &S) -> StorageResult<Vec<Document>> {
    match store.load() {
        Ok(Some(documents)) => {
            tracing::info!(
                "Loaded {} prior documents from {}",
                documents.len(),
                store.location()
            );
            Ok(documents)
        }
        Ok(None) => {
            tracing::info!("No checkpoint at {}, starting fresh", store.location());
            Ok(Vec::new())
        }
        Err(e @ StorageError::Decode { .. }) => {
            tracing::warn!("Ignoring unreadable checkpoint: {}", e);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// Writes a snapshot of `documents`, skipping empty sets
///
/// # Returns
///
/// * `Ok(true)` - The snapshot was written
/// * `Ok(false)` - There was nothing to write
pub fn save_snapshot<S: DocumentStore + ?Sized>(
    store: &S,
    documents: &[Document],
) -> StorageResult<bool> {
    if documents.is_empty() {
        tracing::debug!("No documents to save to {}", store.location());
        return Ok(false);
    }

    store.save(documents)?;
    tracing::info!("Saved {} documents to {}", documents.len(), store.location());
    Ok(true)
}
