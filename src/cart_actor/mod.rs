//! Cart-specific domain logic: one actor per conversation owns that
//! conversation's cart.

mod actions;
pub mod entity;
pub mod error;
pub mod store;

pub use actions::*;
pub use error::*;
pub use store::CartStore;

use crate::actor_framework::ResourceActor;
use crate::clients::CartClient;
use crate::domain::{Cart, ConversationId};

/// Spawns the cart actor for `conversation` and returns its client.
pub fn spawn(conversation: ConversationId, mailbox_size: usize) -> CartClient {
    CartClient::new(ResourceActor::<Cart>::spawn(mailbox_size, conversation))
}
