use crate::actor_framework::ResourceClient;
use crate::cart_actor::{CartAction, CartActionResult, CartError};
use crate::domain::{Cart, CartLine, ProductId};
use tracing::{debug, instrument};

/// Client for interacting with one conversation's cart actor.
#[derive(Clone)]
pub struct CartClient {
    inner: ResourceClient<Cart>,
}

impl_client_new!(CartClient, Cart);

impl_action_methods!(CartClient, CartAction => CartActionResult, CartError {
    fn add_or_increment(product_id: ProductId, delta: i64) -> u32;
    fn clear() -> usize;
    fn snapshot_lines() -> Vec<CartLine>;
});

impl CartClient {
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<Cart, CartError> {
        debug!("Sending request");
        Ok(self.inner.get().await?)
    }
}
