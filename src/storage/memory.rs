//! In-memory storage fake with failure injection.
//!
//! Orders are staged locally and only become visible when the whole insert
//! finishes, mirroring a committed transaction. Running past the deadline
//! while staging leaves nothing behind; the commit step itself is unbounded.

use super::{CatalogSource, OrderStore, StorageError};
use crate::domain::{NewOrder, OrderId, Product, ProductId};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Default)]
pub struct MemoryStorage {
    products: Mutex<Vec<Product>>,
    committed: Mutex<Vec<(OrderId, NewOrder)>>,
    next_order_id: AtomicI64,
    fail_catalog: AtomicBool,
    catalog_delay: Mutex<Option<Duration>>,
    /// Fail while inserting the line at this index (usize::MAX = never).
    fail_at_line: AtomicUsize,
    order_delay: Mutex<Option<Duration>>,
    /// Number of `fetch_all` calls made
    pub fetch_all_calls: AtomicUsize,
    fetches_in_flight: AtomicUsize,
    max_fetches_in_flight: AtomicUsize,
    /// Delay between the end of the order deadline window and the commit.
    commit_delay: Mutex<Option<Duration>>,
}

impl MemoryStorage {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
            next_order_id: AtomicI64::new(1),
            fail_at_line: AtomicUsize::new(usize::MAX),
            ..Self::default()
        }
    }

    pub fn set_products(&self, products: Vec<Product>) {
        *self.products.lock() = products;
    }

    pub fn fail_catalog(&self, fail: bool) {
        self.fail_catalog.store(fail, Ordering::SeqCst);
    }

    pub fn delay_catalog(&self, delay: Duration) {
        *self.catalog_delay.lock() = Some(delay);
    }

    /// Make every order insert fail on the line at `index`.
    pub fn fail_orders_at_line(&self, index: usize) {
        self.fail_at_line.store(index, Ordering::SeqCst);
    }

    pub fn heal_orders(&self) {
        self.fail_at_line.store(usize::MAX, Ordering::SeqCst);
    }

    pub fn delay_orders(&self, delay: Duration) {
        *self.order_delay.lock() = Some(delay);
    }

    pub fn committed_orders(&self) -> Vec<(OrderId, NewOrder)> {
        self.committed.lock().clone()
    }

    pub fn committed_line_count(&self) -> usize {
        self.committed.lock().iter().map(|(_, order)| order.lines.len()).sum()
    }

    /// Highest number of `fetch_all` calls that were running at once.
    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_fetches_in_flight.load(Ordering::SeqCst)
    }

    /// Make every commit take `delay` after its inserts finished.
    pub fn delay_commits(&self, delay: Duration) {
        *self.commit_delay.lock() = Some(delay);
    }

    async fn catalog_gate(&self) -> Result<(), StorageError> {
        let delay = *self.catalog_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_catalog.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("catalog source is down".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for MemoryStorage {
    async fn fetch_all(&self) -> Result<Vec<Product>, StorageError> {
        self.fetch_all_calls.fetch_add(1, Ordering::SeqCst);
        let running = self.fetches_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_fetches_in_flight.fetch_max(running, Ordering::SeqCst);
        let gate = self.catalog_gate().await;
        self.fetches_in_flight.fetch_sub(1, Ordering::SeqCst);
        gate?;
        Ok(self.products.lock().clone())
    }

    async fn search(&self, query: &str) -> Result<Vec<Product>, StorageError> {
        self.catalog_gate().await?;
        Ok(self
            .products
            .lock()
            .iter()
            .filter(|product| product.matches(query))
            .cloned()
            .collect())
    }

    async fn fetch_by_id(&self, id: ProductId) -> Result<Option<Product>, StorageError> {
        self.catalog_gate().await?;
        Ok(self.products.lock().iter().find(|product| product.id == id).cloned())
    }
}

#[async_trait]
impl OrderStore for MemoryStorage {
    async fn insert_order(&self, order: &NewOrder, deadline: Duration) -> Result<OrderId, StorageError> {
        let staging = async {
            let fail_at = self.fail_at_line.load(Ordering::SeqCst);
            let mut staged = Vec::with_capacity(order.lines.len());
            for (index, line) in order.lines.iter().enumerate() {
                if index == fail_at {
                    return Err(StorageError::Unavailable(format!("injected failure on line {index}")));
                }
                staged.push(*line);
            }

            let delay = *self.order_delay.lock();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Ok(staged)
        };
        let staged = tokio::time::timeout(deadline, staging)
            .await
            .map_err(|_| StorageError::Timeout(deadline))??;

        let delay = *self.commit_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let id = OrderId(self.next_order_id.fetch_add(1, Ordering::SeqCst));
        let mut committed = order.clone();
        committed.lines = staged;
        self.committed.lock().push((id, committed));
        Ok(id)
    }
}
