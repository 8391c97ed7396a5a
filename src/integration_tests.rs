#[cfg(test)]
mod tests {
    use crate::app_system::{ShopSettings, ShopSystem};
    use crate::conversation::controller::{
        CART_EMPTY, GREETING, ORDER_FAILED, ORDER_PLACED, SEARCH_PROMPT,
    };
    use crate::conversation::{Delivery, InboundEvent, RecordingSink, Reply};
    use crate::domain::{ConversationId, Product};
    use crate::storage::memory::MemoryStorage;
    use crate::storage::SqlStorage;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    const ALICE: ConversationId = ConversationId(100);
    const BOB: ConversationId = ConversationId(200);

    async fn seeded_sql() -> SqlStorage {
        let storage = SqlStorage::in_memory().await.unwrap();
        assert_eq!(storage.seed_demo_catalog().await.unwrap(), 5);
        storage
    }

    async fn start(storage: SqlStorage, sink: Arc<RecordingSink>) -> ShopSystem {
        let storage = Arc::new(storage);
        ShopSystem::start(storage.clone(), storage, sink, ShopSettings::default()).await
    }

    async fn count(storage: &SqlStorage, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(storage.pool())
            .await
            .unwrap()
    }

    fn payloads(reply: &Reply) -> Vec<String> {
        reply
            .keyboard
            .as_ref()
            .map(|k| k.buttons().map(|b| b.payload.clone()).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_search_add_and_checkout_against_sqlite() {
        let storage = seeded_sql().await;
        let sink = Arc::new(RecordingSink::default());
        let system = start(storage.clone(), sink.clone()).await;
        let dispatcher = system.dispatcher();

        // 1. Browse, search and pick a quantity
        for event in [
            InboundEvent::command(ALICE, "start"),
            InboundEvent::text(ALICE, "Find beer"),
            InboundEvent::text(ALICE, "harbour"),
            InboundEvent::action(ALICE, "add_to_cart:2"),
            InboundEvent::action(ALICE, "adjust_quantity:2:1:1"),
            InboundEvent::action(ALICE, "confirm_add:2:2"),
            InboundEvent::text(ALICE, "Cart"),
            InboundEvent::action(ALICE, "checkout"),
            InboundEvent::action(ALICE, "cart"),
        ] {
            dispatcher.dispatch(event).await.unwrap();
        }
        system.shutdown().await.unwrap();

        // 2. Verify the conversation, reply by reply
        let replies = sink.replies_for(ALICE);
        assert_eq!(replies.len(), 9);
        assert_eq!(replies[0].text, GREETING);
        assert_eq!(replies[1].text, SEARCH_PROMPT);
        assert!(replies[2].text.starts_with("*Harbour Stout - Stout*\nPrice: 3.10"));
        assert_eq!(payloads(&replies[2]), vec!["add_to_cart:2"]);
        assert_eq!(replies[3].text, "Choose quantity of Harbour Stout:");
        assert_eq!(replies[4].delivery, Delivery::EditPrevious);
        assert!(payloads(&replies[4]).contains(&"confirm_add:2:2".to_string()));
        assert_eq!(replies[5].text, "Harbour Stout (2 pcs) added to cart.");
        assert_eq!(replies[6].text, "*Harbour Stout*\nQuantity: 2\nPrice: 6.20\n\nTotal: 6.20");
        assert_eq!(replies[7].text, ORDER_PLACED);
        assert_eq!(replies[8].text, CART_EMPTY);

        // 3. Verify what was persisted
        assert_eq!(count(&storage, "orders").await, 1);
        let (beer_id, quantity): (i64, i64) = sqlx::query_as("SELECT beer_id, quantity FROM order_items")
            .fetch_one(storage.pool())
            .await
            .unwrap();
        assert_eq!((beer_id, quantity), (2, 2));
        let (owner, status): (i64, String) = sqlx::query_as("SELECT user_id, status FROM orders")
            .fetch_one(storage.pool())
            .await
            .unwrap();
        assert_eq!((owner, status.as_str()), (ALICE.0, "new"));
    }

    #[tokio::test]
    async fn test_failed_checkout_rolls_back_and_keeps_cart() {
        let storage = seeded_sql().await;
        sqlx::raw_sql(
            "CREATE TRIGGER reject_ipa BEFORE INSERT ON order_items \
             WHEN NEW.beer_id = 4 BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
        )
        .execute(storage.pool())
        .await
        .unwrap();
        let sink = Arc::new(RecordingSink::default());
        let system = start(storage.clone(), sink.clone()).await;
        let dispatcher = system.dispatcher();

        for event in [
            InboundEvent::action(ALICE, "confirm_add:1:3"),
            InboundEvent::action(ALICE, "confirm_add:4:1"),
            InboundEvent::action(ALICE, "checkout"),
            InboundEvent::action(ALICE, "cart"),
        ] {
            dispatcher.dispatch(event).await.unwrap();
        }
        system.shutdown().await.unwrap();

        let replies = sink.replies_for(ALICE);
        assert_eq!(replies[2].text, ORDER_FAILED);
        assert_eq!(
            replies[3].text,
            "*Brewery Pils*\nQuantity: 3\nPrice: 7.20\n\n*Night Shift IPA*\nQuantity: 1\nPrice: 3.50\n\nTotal: 10.70"
        );
        assert_eq!(count(&storage, "orders").await, 0);
        assert_eq!(count(&storage, "order_items").await, 0);
    }

    #[tokio::test]
    async fn test_conversations_do_not_share_carts() {
        let sink = Arc::new(RecordingSink::default());
        let system = start(seeded_sql().await, sink.clone()).await;
        let dispatcher = system.dispatcher();

        dispatcher.dispatch(InboundEvent::action(ALICE, "confirm_add:3:1")).await.unwrap();
        dispatcher.dispatch(InboundEvent::action(BOB, "clear_cart")).await.unwrap();
        dispatcher.dispatch(InboundEvent::action(BOB, "cart")).await.unwrap();
        dispatcher.dispatch(InboundEvent::action(ALICE, "cart")).await.unwrap();
        system.shutdown().await.unwrap();

        assert_eq!(sink.replies_for(BOB)[1].text, CART_EMPTY);
        assert!(sink.replies_for(ALICE)[1].text.contains("Orchard Weiss"));
    }

    #[tokio::test]
    async fn test_catalog_outage_after_startup_serves_last_snapshot() {
        let storage = Arc::new(MemoryStorage::new(vec![
            Product::new(1, "Porter", Decimal::new(200, 2), 4),
            Product::new(2, "Pale Ale", Decimal::new(250, 2), 6),
            Product::new(3, "Kolsch", Decimal::new(220, 2), 8),
        ]));
        let sink = Arc::new(RecordingSink::default());
        let system = ShopSystem::start(storage.clone(), storage.clone(), sink.clone(), ShopSettings::default()).await;

        storage.fail_catalog(true);
        assert!(system.catalog().refresh().await.is_err());
        assert_eq!(system.catalog().current().products.len(), 3);

        let dispatcher = system.dispatcher();
        dispatcher.dispatch(InboundEvent::text(ALICE, "Show beer")).await.unwrap();
        dispatcher.dispatch(InboundEvent::action(ALICE, "confirm_add:3:2")).await.unwrap();
        dispatcher.dispatch(InboundEvent::action(ALICE, "checkout")).await.unwrap();
        system.shutdown().await.unwrap();

        let replies = sink.replies_for(ALICE);
        assert_eq!(payloads(&replies[0]), vec!["add_to_cart:1", "add_to_cart:2", "add_to_cart:3"]);
        assert_eq!(replies[1].text, "Kolsch (2 pcs) added to cart.");
        assert_eq!(replies[2].text, ORDER_PLACED);
        assert_eq!(storage.committed_orders().len(), 1);
    }
}
