use super::{ShopSettings, SystemError};
use crate::cart_actor::CartStore;
use crate::catalog::{spawn_refresh_loop, CatalogStore};
use crate::conversation::{ConversationController, Dispatcher, ReplySink};
use crate::order_submitter::OrderSubmitter;
use crate::storage::{CatalogSource, OrderStore};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// The running application: catalog, carts, order submission and the
/// dispatcher that feeds them.
///
/// Responsible for starting everything, wiring it together, and shutting it
/// down in order.
pub struct ShopSystem {
    catalog: CatalogStore,
    dispatcher: Dispatcher,
    cancel: CancellationToken,
    refresh_handle: JoinHandle<()>,
}

impl ShopSystem {
    /// Start the system. An unreachable catalog at startup is logged, not
    /// fatal: reads fall through to the source until a refresh succeeds.
    pub async fn start(
        source: Arc<dyn CatalogSource>,
        orders: Arc<dyn OrderStore>,
        sink: Arc<dyn ReplySink>,
        settings: ShopSettings,
    ) -> Self {
        let timeouts = settings.timeouts;

        let catalog = CatalogStore::new(source, timeouts.refresh_timeout);
        if let Err(e) = catalog.refresh().await {
            warn!(error = %e, "Initial catalog refresh failed; will retry on schedule");
        }

        let carts = CartStore::new(settings.mailbox_size);
        let submitter = OrderSubmitter::new(orders, timeouts.submit_timeout);
        let controller = Arc::new(ConversationController::new(catalog.clone(), carts, submitter));
        let dispatcher = Dispatcher::new(controller, sink, settings.mailbox_size, timeouts.lane_idle);

        let cancel = CancellationToken::new();
        let refresh_handle = spawn_refresh_loop(catalog.clone(), timeouts.refresh_interval, cancel.clone());

        info!(
            refresh_interval = ?timeouts.refresh_interval,
            mailbox_size = settings.mailbox_size,
            "Shop system started"
        );
        Self { catalog, dispatcher, cancel, refresh_handle }
    }

    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// Stop the refresh loop, drain every conversation lane, and wait for both.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down shop system...");
        self.cancel.cancel();
        self.dispatcher.close().await;
        self.refresh_handle.await?;
        info!("Shop system shutdown complete.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{InboundEvent, RecordingSink};
    use crate::domain::{ConversationId, Product};
    use crate::storage::memory::MemoryStorage;
    use rust_decimal::Decimal;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    #[tokio::test]
    async fn test_start_survives_catalog_outage() {
        let storage = Arc::new(MemoryStorage::new(vec![Product::new(1, "Porter", Decimal::ONE, 1)]));
        storage.fail_catalog(true);
        let sink = Arc::new(RecordingSink::default());

        let system = ShopSystem::start(storage.clone(), storage.clone(), sink, ShopSettings::default()).await;

        assert!(!system.catalog().current().is_loaded());
        system.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_loop_runs_until_shutdown() {
        let storage = Arc::new(MemoryStorage::new(vec![Product::new(1, "Porter", Decimal::ONE, 1)]));
        let sink = Arc::new(RecordingSink::default());
        let mut settings = ShopSettings::default();
        settings.timeouts.refresh_interval = Duration::from_secs(60);

        let system = ShopSystem::start(storage.clone(), storage.clone(), sink, settings).await;
        assert_eq!(storage.fetch_all_calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(125)).await;
        assert_eq!(storage.fetch_all_calls.load(Ordering::SeqCst), 3);

        system.shutdown().await.unwrap();
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(storage.fetch_all_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_shutdown_delivers_pending_replies() {
        let storage = Arc::new(MemoryStorage::new(vec![Product::new(1, "Porter", Decimal::ONE, 1)]));
        let sink = Arc::new(RecordingSink::default());
        let system = ShopSystem::start(storage.clone(), storage, sink.clone(), ShopSettings::default()).await;

        let dispatcher = system.dispatcher();
        for _ in 0..5 {
            dispatcher.dispatch(InboundEvent::command(ConversationId(3), "start")).await.unwrap();
        }
        system.shutdown().await.unwrap();

        assert_eq!(sink.replies_for(ConversationId(3)).len(), 5);
    }
}
