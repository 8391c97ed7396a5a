//! Storage seams consumed by the core.
//!
//! The catalog cache and the order submitter only see these traits; the SQLite
//! adapter in [`sql`] is one implementation and [`memory`] is the fake used in
//! tests. Callers bound every call with their own deadline.

mod schema;
pub mod sql;

#[cfg(test)]
pub mod memory;

pub use sql::SqlStorage;

use crate::domain::{NewOrder, OrderId, Product, ProductId};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Corrupt row: {0}")]
    CorruptRow(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    /// The deadline passed before the commit was issued; nothing was written.
    #[error("Timed out after {0:?} before commit")]
    Timeout(Duration),
}

/// Read side of the product catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Every product, ordered by id
    async fn fetch_all(&self) -> Result<Vec<Product>, StorageError>;

    /// Case-insensitive substring search over product names and kinds
    async fn search(&self, query: &str) -> Result<Vec<Product>, StorageError>;

    async fn fetch_by_id(&self, id: ProductId) -> Result<Option<Product>, StorageError>;
}

/// Transactional order persistence.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert the header and every line in one transaction. Either everything
    /// is committed or nothing is.
    ///
    /// `deadline` bounds the work up to the commit. Running out of it rolls the
    /// transaction back and yields [`StorageError::Timeout`]. Once the commit
    /// has been issued it runs to completion, so a reported timeout always
    /// means no order exists.
    async fn insert_order(&self, order: &NewOrder, deadline: Duration) -> Result<OrderId, StorageError>;
}
