//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_get`] or [`expect_action`] to assert behavior.

use crate::actor_framework::{Entity, FrameworkError, ResourceClient, ResourceRequest};
use tokio::sync::{mpsc, oneshot};

/// Creates a mock client and a receiver for asserting requests.
///
/// # Testing Strategy
/// A client test does not need a running `ResourceActor`. The mock client sends
/// to a channel the test owns, so the test can inspect each request and answer
/// it with whatever result (or dropped responder) it wants to simulate.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<oneshot::Sender<Result<T, FrameworkError>>> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Action, oneshot::Sender<Result<T::ActionResult, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { action, respond_to }) => Some((action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart_actor::{CartAction, CartActionResult};
    use crate::domain::Cart;

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Cart>(10);

        let task = tokio::spawn(async move { client.perform_action(CartAction::SnapshotLines).await });

        let (action, responder) = expect_action(&mut receiver).await.expect("Expected Action request");
        assert!(matches!(action, CartAction::SnapshotLines));
        responder.send(Ok(CartActionResult::SnapshotLines(vec![]))).unwrap();

        let result = task.await.unwrap();
        assert_eq!(result, Ok(CartActionResult::SnapshotLines(vec![])));
    }

    #[tokio::test]
    async fn test_expect_get_rejects_other_requests() {
        let (client, mut receiver) = create_mock_client::<Cart>(10);

        tokio::spawn(async move {
            let _ = client.perform_action(CartAction::Clear).await;
        });

        assert!(expect_get(&mut receiver).await.is_none());
    }
}
