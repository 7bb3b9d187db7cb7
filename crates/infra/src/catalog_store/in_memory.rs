use std::collections::HashMap;
use std::sync::RwLock;

use stockledger_core::{Product, ProductId};

use super::query::ProductFilter;
use super::r#trait::{CatalogStore, StoreError};

/// In-memory catalog store.
///
/// Intended for tests/dev. Not optimized for performance. `upsert_batch`
/// holds the write guard for the whole batch, so no reader can observe a
/// partially applied batch.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_by_id(mut products: Vec<Product>) -> Vec<Product> {
        products.sort_by_key(|p| p.id);
        products
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn create(&self, product: Product) -> Result<Product, StoreError> {
        let mut products = self.products.write().map_err(|_| poisoned())?;
        if products.contains_key(&product.id) {
            return Err(StoreError::AlreadyExists(product.id));
        }
        products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        Ok(products.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        let mut found: Vec<Product> = ids
            .iter()
            .filter_map(|id| products.get(id).cloned())
            .collect();
        found.sort_by_key(|p| p.id);
        found.dedup_by_key(|p| p.id);
        Ok(found)
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        Ok(Self::sorted_by_id(products.values().cloned().collect()))
    }

    async fn update(&self, product: Product) -> Result<Product, StoreError> {
        let mut products = self.products.write().map_err(|_| poisoned())?;
        if !products.contains_key(&product.id) {
            return Err(StoreError::NotFound(product.id));
        }
        products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn remove(&self, id: ProductId) -> Result<Product, StoreError> {
        let mut products = self.products.write().map_err(|_| poisoned())?;
        products.remove(&id).ok_or(StoreError::NotFound(id))
    }

    async fn query(&self, filter: ProductFilter) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        Ok(Self::sorted_by_id(
            products
                .values()
                .filter(|p| filter.matches(p))
                .cloned()
                .collect(),
        ))
    }

    async fn upsert_batch(&self, batch: Vec<Product>) -> Result<Vec<Product>, StoreError> {
        // One write guard for the whole batch: all rows land together.
        let mut products = self.products.write().map_err(|_| poisoned())?;
        for product in &batch {
            products.insert(product.id, product.clone());
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(stock: i64) -> Product {
        Product::new(ProductId::new(), "Widget", stock, 100).unwrap()
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = InMemoryCatalogStore::new();
        let product = widget(5);
        store.create(product.clone()).await.unwrap();
        assert_eq!(store.get(product.id).await.unwrap(), Some(product));
    }

    #[tokio::test]
    async fn create_rejects_duplicate_id() {
        let store = InMemoryCatalogStore::new();
        let product = widget(5);
        store.create(product.clone()).await.unwrap();
        assert!(matches!(
            store.create(product).await,
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn get_many_omits_missing_ids() {
        let store = InMemoryCatalogStore::new();
        let a = widget(1);
        store.create(a.clone()).await.unwrap();
        let missing = ProductId::new();

        let found = store.get_many(&[a.id, missing]).await.unwrap();
        assert_eq!(found, vec![a]);
    }

    #[tokio::test]
    async fn get_many_deduplicates_ids() {
        let store = InMemoryCatalogStore::new();
        let a = widget(1);
        store.create(a.clone()).await.unwrap();

        let found = store.get_many(&[a.id, a.id]).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn update_requires_existing_row() {
        let store = InMemoryCatalogStore::new();
        assert!(matches!(
            store.update(widget(1)).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn remove_returns_the_removed_row() {
        let store = InMemoryCatalogStore::new();
        let product = widget(5);
        store.create(product.clone()).await.unwrap();

        let removed = store.remove(product.id).await.unwrap();
        assert_eq!(removed, product);
        assert_eq!(store.get(product.id).await.unwrap(), None);

        assert!(matches!(
            store.remove(product.id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn query_filters_and_sorts_by_id() {
        let store = InMemoryCatalogStore::new();
        let low = widget(2);
        let high = widget(50);
        store.create(high.clone()).await.unwrap();
        store.create(low.clone()).await.unwrap();

        let result = store.query(ProductFilter::stock_at_most(10)).await.unwrap();
        assert_eq!(result, vec![low.clone()]);

        let all = store.query(ProductFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].id < all[1].id);
    }

    #[tokio::test]
    async fn upsert_batch_inserts_and_overwrites() {
        let store = InMemoryCatalogStore::new();
        let existing = widget(10);
        store.create(existing.clone()).await.unwrap();

        let updated = Product::new(existing.id, "Widget", 4, 100).unwrap();
        let fresh = widget(7);
        let committed = store
            .upsert_batch(vec![updated.clone(), fresh.clone()])
            .await
            .unwrap();

        assert_eq!(committed, vec![updated.clone(), fresh.clone()]);
        assert_eq!(store.get(existing.id).await.unwrap(), Some(updated));
        assert_eq!(store.get(fresh.id).await.unwrap(), Some(fresh));
    }
}
