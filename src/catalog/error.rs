use crate::storage::StorageError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while reading or refreshing the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog source failed: {0}")]
    Source(#[from] StorageError),
    #[error("Catalog source timed out after {0:?}")]
    Timeout(Duration),
}
