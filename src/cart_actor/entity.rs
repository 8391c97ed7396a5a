use super::actions::{CartAction, CartActionResult};
use crate::actor_framework::Entity;
use crate::domain::{Cart, ConversationId};

impl Entity for Cart {
    type Id = ConversationId;
    type Action = CartAction;
    type ActionResult = CartActionResult;

    fn id(&self) -> &ConversationId {
        &self.conversation
    }

    /// A conversation's cart starts out empty.
    fn from_id(id: ConversationId) -> Self {
        Cart::new(id)
    }

    /// Handles cart-specific actions.
    ///
    /// # Actions
    /// - `AddOrIncrement`: adds to a line, floored at 1
    /// - `Clear`: removes all lines
    /// - `SnapshotLines`: returns the ordered lines
    fn handle_action(&mut self, action: CartAction) -> Result<CartActionResult, String> {
        match action {
            CartAction::AddOrIncrement { product_id, delta } => {
                Ok(CartActionResult::AddOrIncrement(self.add_or_increment(product_id, delta)))
            }
            CartAction::Clear => {
                let removed = self.len();
                self.clear();
                Ok(CartActionResult::Clear(removed))
            }
            CartAction::SnapshotLines => Ok(CartActionResult::SnapshotLines(self.lines())),
        }
    }
}
