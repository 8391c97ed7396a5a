//! Turns a cart snapshot into a persisted order, all or nothing.

pub mod error;

pub use error::*;

use crate::domain::{CartLine, ConversationId, NewOrder, OrderId};
use crate::storage::{OrderStore, StorageError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument};

#[derive(Clone)]
pub struct OrderSubmitter {
    store: Arc<dyn OrderStore>,
    timeout: Duration,
}

impl OrderSubmitter {
    pub fn new(store: Arc<dyn OrderStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Persist one order header and one row per line in a single transaction.
    ///
    /// Empty `lines` are rejected before any storage call. The timeout bounds
    /// the inserts; a commit that has started is awaited, so `Timeout` always
    /// means nothing was persisted. The cart is never touched here; clearing
    /// it on success is the caller's job.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn submit(&self, owner: ConversationId, lines: Vec<CartLine>) -> Result<OrderId, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let order = NewOrder::new(owner, lines);
        match self.store.insert_order(&order, self.timeout).await {
            Ok(order_id) => {
                info!(%order_id, "Order created successfully");
                Ok(order_id)
            }
            Err(StorageError::Timeout(deadline)) => {
                error!(timeout = ?deadline, "Order insert timed out, transaction rolled back");
                Err(OrderError::Timeout(deadline))
            }
            Err(e) => {
                error!(error = %e, "Order insert failed, transaction rolled back");
                Err(OrderError::DatabaseError(e))
            }
        }
    }
}
