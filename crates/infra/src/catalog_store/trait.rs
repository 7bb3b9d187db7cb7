use std::sync::Arc;

use thiserror::Error;

use stockledger_core::{Product, ProductId};

use super::query::ProductFilter;

/// Catalog store operation error.
///
/// These are **infrastructure errors** (missing rows, key collisions,
/// backend failures) as opposed to domain errors (validation). The service
/// layer maps them onto its caller-facing error kinds.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `create` targeted an id that is already taken.
    #[error("product already exists: {0}")]
    AlreadyExists(ProductId),

    /// `update`/`remove` targeted an id with no stored row.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// The storage backend failed (connection loss, constraint violation,
    /// poisoned lock). Carries a description of the first cause.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Durable keyed storage of catalog products.
///
/// ## Design principles
///
/// - **No storage assumptions**: works with an in-memory map (tests/dev)
///   and SQL backends (production).
/// - **Explicit handle**: implementations are plain values the caller
///   constructs and passes in; there is no process-wide singleton.
/// - **Atomic batch commit**: `upsert_batch` applies all rows or none.
///   This is the contract the reconciliation engine builds on; partial
///   application after a mid-batch failure is a defect of the
///   implementation, not a tolerated outcome.
///
/// ## Ordering
///
/// `list`, `get_many`, and `query` return rows in ascending id order so
/// read paths are deterministic and testable.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert a new product. Fails with [`StoreError::AlreadyExists`] when
    /// the id is taken.
    async fn create(&self, product: Product) -> Result<Product, StoreError>;

    /// Fetch one product, `None` when absent (absence is not an error at
    /// this boundary).
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Fetch many products in a single round trip. Missing ids are
    /// silently omitted; duplicated ids yield one row. Exists so batch
    /// reconciliation is O(1) round trips instead of O(n).
    async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError>;

    /// All products, ascending by id.
    async fn list(&self) -> Result<Vec<Product>, StoreError>;

    /// Overwrite the mutable fields of an existing product. Fails with
    /// [`StoreError::NotFound`] when absent.
    async fn update(&self, product: Product) -> Result<Product, StoreError>;

    /// Delete a product, returning the removed row. Fails with
    /// [`StoreError::NotFound`] when absent.
    async fn remove(&self, id: ProductId) -> Result<Product, StoreError>;

    /// Predicate query, ascending by id.
    async fn query(&self, filter: ProductFilter) -> Result<Vec<Product>, StoreError>;

    /// Apply a batch of inserts/overwrites as one atomic unit.
    ///
    /// Rows are applied in input order (later rows win on id collision)
    /// and returned in the same order. Either every row is durably
    /// visible afterwards or none is.
    async fn upsert_batch(&self, products: Vec<Product>) -> Result<Vec<Product>, StoreError>;
}

#[async_trait::async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn create(&self, product: Product) -> Result<Product, StoreError> {
        (**self).create(product).await
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get(id).await
    }

    async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        (**self).get_many(ids).await
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list().await
    }

    async fn update(&self, product: Product) -> Result<Product, StoreError> {
        (**self).update(product).await
    }

    async fn remove(&self, id: ProductId) -> Result<Product, StoreError> {
        (**self).remove(id).await
    }

    async fn query(&self, filter: ProductFilter) -> Result<Vec<Product>, StoreError> {
        (**self).query(filter).await
    }

    async fn upsert_batch(&self, products: Vec<Product>) -> Result<Vec<Product>, StoreError> {
        (**self).upsert_batch(products).await
    }
}
