use crate::storage::StorageError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while submitting an order.
///
/// Every variant means nothing was persisted.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order has no lines")]
    EmptyOrder,
    #[error("Order database error: {0}")]
    DatabaseError(#[from] StorageError),
    #[error("Order submission timed out after {0:?}")]
    Timeout(Duration),
}
