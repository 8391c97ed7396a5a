use super::CartError;
use crate::clients::CartClient;
use crate::domain::{Cart, CartLine, ConversationId, ProductId};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Registry of per-conversation cart actors.
///
/// The map is only consulted to find or create a conversation's client; all
/// cart state lives inside the actors. Requests for one conversation queue on
/// that conversation's mailbox, so they are serialized without ever touching
/// another conversation's cart.
///
/// Actors live for the lifetime of the store; carts are emptied, never reaped.
#[derive(Clone)]
pub struct CartStore {
    carts: Arc<DashMap<ConversationId, CartClient>>,
    mailbox_size: usize,
}

impl CartStore {
    pub fn new(mailbox_size: usize) -> Self {
        Self {
            carts: Arc::new(DashMap::new()),
            mailbox_size,
        }
    }

    /// Client for an existing cart, if this conversation ever had one.
    fn existing(&self, conversation: ConversationId) -> Option<CartClient> {
        self.carts.get(&conversation).map(|entry| entry.value().clone())
    }

    /// Client for the conversation's cart, spawning its actor on first use.
    fn client_for(&self, conversation: ConversationId) -> CartClient {
        if let Some(client) = self.existing(conversation) {
            return client;
        }
        self.carts
            .entry(conversation)
            .or_insert_with(|| {
                debug!(%conversation, "Spawning cart actor");
                super::spawn(conversation, self.mailbox_size)
            })
            .value()
            .clone()
    }

    /// Add `delta` of `product_id` to the cart; returns the line's new quantity.
    #[instrument(skip(self))]
    pub async fn add_or_increment(
        &self,
        conversation: ConversationId,
        product_id: ProductId,
        delta: i64,
    ) -> Result<u32, CartError> {
        self.client_for(conversation).add_or_increment(product_id, delta).await
    }

    /// The conversation's cart; empty when it never had one.
    #[instrument(skip(self))]
    pub async fn get(&self, conversation: ConversationId) -> Result<Cart, CartError> {
        match self.existing(conversation) {
            Some(client) => client.get_cart().await,
            None => Ok(Cart::new(conversation)),
        }
    }

    #[instrument(skip(self))]
    pub async fn clear(&self, conversation: ConversationId) -> Result<(), CartError> {
        if let Some(client) = self.existing(conversation) {
            let removed = client.clear().await?;
            debug!(removed, "Cart cleared");
        }
        Ok(())
    }

    /// Ordered lines, read in one step by the cart's actor.
    #[instrument(skip(self))]
    pub async fn snapshot_lines(&self, conversation: ConversationId) -> Result<Vec<CartLine>, CartError> {
        match self.existing(conversation) {
            Some(client) => client.snapshot_lines().await,
            None => Ok(Vec::new()),
        }
    }

    #[cfg(test)]
    pub fn actor_count(&self) -> usize {
        self.carts.len()
    }
}
