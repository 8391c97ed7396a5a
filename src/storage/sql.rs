//! SQLite implementation of the storage seams.

use super::schema::{DEMO_CATALOG, SCHEMA};
use super::{CatalogSource, OrderStore, StorageError};
use crate::domain::{NewOrder, OrderId, Product, ProductId};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, instrument};

const PRODUCT_COLUMNS: &str = "id, name, description, price, quantity, type, image_url";

/// Pooled handle to the shop database. Cheap to clone.
#[derive(Clone)]
pub struct SqlStorage {
    pool: SqlitePool,
}

impl SqlStorage {
    /// Open (creating if needed) the database at `url` and run migrations.
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        let storage = Self { pool };
        storage.migrate().await?;
        info!(url, "Connected to database");
        Ok(storage)
    }

    /// Open a private in-memory database (for testing).
    ///
    /// A single connection that never idles out, otherwise the database would
    /// vanish between queries.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let storage = Self { pool };
        storage.migrate().await?;
        Ok(storage)
    }

    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables and indexes. Idempotent.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Insert the demo catalog when the beers table is empty.
    ///
    /// Returns the number of inserted products.
    pub async fn seed_demo_catalog(&self) -> Result<usize, StorageError> {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM beers")
            .fetch_one(&self.pool)
            .await?;
        if existing > 0 {
            debug!(existing, "Catalog already populated, skipping seed");
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        for &(name, kind, price, stock, description) in DEMO_CATALOG {
            sqlx::query(
                "INSERT INTO beers (name, type, price, quantity, description) VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(name)
            .bind(kind)
            .bind(price)
            .bind(stock)
            .bind(description)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        info!(count = DEMO_CATALOG.len(), "Seeded demo catalog");
        Ok(DEMO_CATALOG.len())
    }

    /// Insert or replace a single product.
    #[cfg(test)]
    pub async fn upsert_product(&self, product: &Product) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO beers (id, name, description, price, quantity, type, image_url)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name, description = excluded.description,
                price = excluded.price, quantity = excluded.quantity,
                type = excluded.type, image_url = excluded.image_url
            "#,
        )
        .bind(product.id.0)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.to_string())
        .bind(i64::from(product.stock))
        .bind(&product.kind)
        .bind(&product.image_url)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn product_from_row(row: &SqliteRow) -> Result<Product, StorageError> {
    let id: i64 = row.try_get("id")?;
    let raw_price: String = row.try_get("price")?;
    let price = Decimal::from_str(raw_price.trim())
        .map_err(|e| StorageError::CorruptRow(format!("beer {id}: price {raw_price:?}: {e}")))?;
    let raw_stock: i64 = row.try_get("quantity")?;
    let stock = u32::try_from(raw_stock)
        .map_err(|_| StorageError::CorruptRow(format!("beer {id}: quantity {raw_stock}")))?;

    Ok(Product {
        id: ProductId(id),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price,
        stock,
        kind: row.try_get("type")?,
        image_url: row.try_get("image_url")?,
    })
}

/// Build a `LIKE` pattern that matches `query` literally anywhere in the value.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl CatalogSource for SqlStorage {
    #[instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<Product>, StorageError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM beers ORDER BY id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<Product>, StorageError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM beers \
             WHERE lower(name) LIKE lower(?1) ESCAPE '\\' OR lower(type) LIKE lower(?1) ESCAPE '\\' \
             ORDER BY id"
        );
        let rows = sqlx::query(&sql)
            .bind(like_pattern(query))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn fetch_by_id(&self, id: ProductId) -> Result<Option<Product>, StorageError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM beers WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(product_from_row).transpose()
    }
}

#[async_trait]
impl OrderStore for SqlStorage {
    #[instrument(skip(self, order), fields(owner = %order.owner, lines = order.lines.len()))]
    async fn insert_order(&self, order: &NewOrder, deadline: Duration) -> Result<OrderId, StorageError> {
        // Every early return drops `tx`, which rolls the transaction back.
        let staged = tokio::time::timeout(deadline, async {
            let mut tx = self.pool.begin().await?;

            let order_id: i64 = sqlx::query_scalar(
                "INSERT INTO orders (user_id, order_date, status) VALUES (?1, ?2, ?3) RETURNING id",
            )
            .bind(order.owner.0)
            .bind(order.created_at)
            .bind(order.status.as_str())
            .fetch_one(&mut *tx)
            .await?;

            for line in &order.lines {
                sqlx::query("INSERT INTO order_items (order_id, beer_id, quantity) VALUES (?1, ?2, ?3)")
                    .bind(order_id)
                    .bind(line.product_id.0)
                    .bind(i64::from(line.quantity))
                    .execute(&mut *tx)
                    .await?;
            }
            Ok::<_, StorageError>((tx, order_id))
        })
        .await;
        let (tx, order_id) = staged.map_err(|_| StorageError::Timeout(deadline))??;

        // Not bounded: an interrupted commit could not be told apart from a rollback.
        tx.commit().await?;
        debug!(order_id, "Order committed");
        Ok(OrderId(order_id))
    }
}
