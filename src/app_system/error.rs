use crate::conversation::TransportError;
use crate::storage::StorageError;
use thiserror::Error;

/// Startup and shutdown failures of the whole system.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Storage setup failed: {0}")]
    Storage(#[from] StorageError),
    #[error("Transport failed: {0}")]
    Transport(#[from] TransportError),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
