//! Catalog cache: an immutable product snapshot, swapped wholesale on refresh.
//!
//! Readers clone the current `Arc<CatalogSnapshot>` under a read lock that is
//! released immediately, so a refresh in flight never blocks request handling
//! and a reader never sees a half-built product list.

pub mod error;

pub use error::*;

use crate::domain::{Product, ProductId};
use crate::storage::CatalogSource;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// A complete, internally consistent copy of the catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub products: Vec<Product>,
    /// `None` until the first successful refresh.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl CatalogSnapshot {
    pub fn new(products: Vec<Product>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            products,
            fetched_at: Some(fetched_at),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.fetched_at.is_some()
    }

    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    pub fn search(&self, query: &str) -> Vec<Product> {
        self.products
            .iter()
            .filter(|product| product.matches(query))
            .cloned()
            .collect()
    }
}

/// Result of a catalog search. `NoMatches` is a normal answer, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    NoMatches,
    Single(Product),
    Many(Vec<Product>),
}

impl From<Vec<Product>> for SearchOutcome {
    fn from(mut products: Vec<Product>) -> Self {
        match products.len() {
            0 => SearchOutcome::NoMatches,
            1 => SearchOutcome::Single(products.remove(0)),
            _ => SearchOutcome::Many(products),
        }
    }
}

#[derive(Clone)]
pub struct CatalogStore {
    source: Arc<dyn CatalogSource>,
    current: Arc<RwLock<Arc<CatalogSnapshot>>>,
    /// Held for the whole fetch-and-publish, so an older fetch can never
    /// overwrite a newer snapshot. Readers never take it.
    refresh_lock: Arc<tokio::sync::Mutex<()>>,
    fetch_timeout: Duration,
}

impl CatalogStore {
    pub fn new(source: Arc<dyn CatalogSource>, fetch_timeout: Duration) -> Self {
        Self {
            source,
            current: Arc::new(RwLock::new(Arc::new(CatalogSnapshot::default()))),
            refresh_lock: Arc::new(tokio::sync::Mutex::new(())),
            fetch_timeout,
        }
    }

    /// Latest published snapshot. Never waits for a refresh.
    pub fn current(&self) -> Arc<CatalogSnapshot> {
        self.current.read().clone()
    }

    /// Fetch the full product list and publish it.
    ///
    /// On failure or timeout the previous snapshot stays in place. Concurrent
    /// calls run one after another.
    #[instrument(name = "catalog_refresh", skip(self))]
    pub async fn refresh(&self) -> Result<Arc<CatalogSnapshot>, CatalogError> {
        let _serialized = self.refresh_lock.lock().await;
        let products = self.bounded(self.source.fetch_all()).await?;
        let snapshot = Arc::new(CatalogSnapshot::new(products, Utc::now()));
        *self.current.write() = snapshot.clone();
        info!(products = snapshot.products.len(), "Published catalog snapshot");
        Ok(snapshot)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        let snapshot = self.current();
        if snapshot.is_loaded() {
            return Ok(snapshot.find(id).cloned());
        }
        debug!("Catalog not loaded yet, asking the source");
        self.bounded(self.source.fetch_by_id(id)).await
    }

    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<SearchOutcome, CatalogError> {
        let snapshot = self.current();
        let products = if snapshot.is_loaded() {
            snapshot.search(query)
        } else {
            debug!("Catalog not loaded yet, asking the source");
            self.bounded(self.source.search(query)).await?
        };
        Ok(SearchOutcome::from(products))
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, CatalogError>
    where
        F: Future<Output = Result<T, crate::storage::StorageError>>,
    {
        match tokio::time::timeout(self.fetch_timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(CatalogError::Timeout(self.fetch_timeout)),
        }
    }
}

/// Refresh `store` every `period` until `cancel` fires.
///
/// The first tick is delayed by one full period; callers usually run an
/// initial `refresh()` themselves before serving traffic.
pub fn spawn_refresh_loop(store: CatalogStore, period: Duration, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(?period, "Catalog refresh loop starting");
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = store.refresh().await {
                        warn!(error = %e, "Catalog refresh failed, keeping previous snapshot");
                    }
                }
            }
        }
        info!("Catalog refresh loop stopped");
    })
}
