//! Postgres-backed catalog store implementation.
//!
//! Persists the product catalog in a single `products` relation keyed by
//! id (see `migrations/0001_catalog.sql`). The atomic multi-row commit of
//! `upsert_batch` is provided by a database transaction: every row of a
//! reconciliation batch lands in one commit or not at all.
//!
//! ## Error mapping
//!
//! SQLx errors are mapped to [`StoreError`] as follows: unique violations
//! (code `23505`) become `AlreadyExists` on the create path, everything
//! else becomes `Backend` carrying the first cause.

use std::sync::Arc;

use sqlx::{PgPool, Row};
use tracing::instrument;

use stockledger_core::{Product, ProductId};

use super::query::ProductFilter;
use super::r#trait::{CatalogStore, StoreError};

/// Postgres-backed catalog store.
///
/// Clones share the underlying connection pool; the pool handles
/// thread-safe connection management, so the store is `Send + Sync` and
/// can be shared across request handlers.
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

const SELECT_COLUMNS: &str = "id, name, stock, price_cents";

#[async_trait::async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn create(&self, product: Product) -> Result<Product, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, stock, price_cents)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.stock)
        .bind(product.price_cents as i64)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::AlreadyExists(product.id)
            } else {
                map_sqlx_error("create", e)
            }
        })?;

        Ok(product)
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get", e))?;

        row.map(|r| product_from_row(&r)).transpose()
    }

    #[instrument(skip(self, ids), fields(id_count = ids.len()), err)]
    async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE id = ANY($1) ORDER BY id ASC"
        ))
        .bind(&uuids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_many", e))?;

        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM products ORDER BY id ASC"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", e))?;

        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn update(&self, product: Product) -> Result<Product, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, stock = $3, price_cents = $4
            WHERE id = $1
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.stock)
        .bind(product.price_cents as i64)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(product.id));
        }
        Ok(product)
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn remove(&self, id: ProductId) -> Result<Product, StoreError> {
        let row = sqlx::query(&format!(
            "DELETE FROM products WHERE id = $1 RETURNING {SELECT_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("remove", e))?;

        match row {
            Some(r) => product_from_row(&r),
            None => Err(StoreError::NotFound(id)),
        }
    }

    #[instrument(skip(self), err)]
    async fn query(&self, filter: ProductFilter) -> Result<Vec<Product>, StoreError> {
        let rows = match filter.stock_at_most {
            Some(threshold) => {
                sqlx::query(&format!(
                    "SELECT {SELECT_COLUMNS} FROM products WHERE stock <= $1 ORDER BY id ASC"
                ))
                .bind(threshold)
                .fetch_all(&*self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {SELECT_COLUMNS} FROM products ORDER BY id ASC"
                ))
                .fetch_all(&*self.pool)
                .await
            }
        }
        .map_err(|e| map_sqlx_error("query", e))?;

        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self, batch), fields(batch_size = batch.len()), err)]
    async fn upsert_batch(&self, batch: Vec<Product>) -> Result<Vec<Product>, StoreError> {
        if batch.is_empty() {
            return Ok(vec![]);
        }

        // One transaction for the whole batch: all rows or none.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        for product in &batch {
            sqlx::query(
                r#"
                INSERT INTO products (id, name, stock, price_cents)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id)
                DO UPDATE SET
                    name = EXCLUDED.name,
                    stock = EXCLUDED.stock,
                    price_cents = EXCLUDED.price_cents
                "#,
            )
            .bind(product.id.as_uuid())
            .bind(&product.name)
            .bind(product.stock)
            .bind(product.price_cents as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("upsert_batch", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(batch)
    }
}

fn product_from_row(row: &sqlx::postgres::PgRow) -> Result<Product, StoreError> {
    let id: uuid::Uuid = row
        .try_get("id")
        .map_err(|e| StoreError::Backend(format!("failed to read id column: {e}")))?;
    let name: String = row
        .try_get("name")
        .map_err(|e| StoreError::Backend(format!("failed to read name column: {e}")))?;
    let stock: i64 = row
        .try_get("stock")
        .map_err(|e| StoreError::Backend(format!("failed to read stock column: {e}")))?;
    let price_cents: i64 = row
        .try_get("price_cents")
        .map_err(|e| StoreError::Backend(format!("failed to read price_cents column: {e}")))?;

    Ok(Product {
        id: ProductId::from_uuid(id),
        name,
        stock,
        price_cents: price_cents as u64,
    })
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::Backend(format!(
            "database error in {}: {}",
            operation,
            db_err.message()
        )),
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        other => StoreError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}

/// Check if an error is a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}
