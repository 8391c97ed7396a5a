use crate::actor_framework::FrameworkError;
use thiserror::Error;

/// Errors that can occur during cart operations.
///
/// Empty carts are never an error; these only report that a cart actor could
/// not be reached or answered unexpectedly.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(#[from] FrameworkError),
    #[error("Unexpected cart reply: {0}")]
    UnexpectedReply(String),
}
