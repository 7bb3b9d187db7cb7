//! Catalog service: CRUD contracts, the reconciliation engine, the
//! low-stock detector, and the dashboard aggregator.

use std::collections::HashMap;

use tracing::instrument;

use stockledger_core::{DomainError, Product, ProductDraft, ProductId, StockChange};
use stockledger_infra::{AuditSink, CatalogStore, ProductFilter, StoreError};

use crate::dashboard::DashboardSnapshot;
use crate::error::CatalogError;

/// Low-stock cutoff the dashboard uses when none is configured.
///
/// Deliberately independent of the caller-supplied threshold of
/// [`CatalogService::get_low_stock`]; the two are not required to agree.
pub const DEFAULT_DASHBOARD_LOW_STOCK_THRESHOLD: i64 = 10;

/// The catalog service.
///
/// Generic over the store and audit sink capabilities so callers select
/// concrete implementations (in-memory, Postgres) at startup. All methods
/// are request-scoped: the service holds no background tasks and no state
/// beyond its handles and configuration.
#[derive(Debug)]
pub struct CatalogService<S, A> {
    store: S,
    audit: A,
    dashboard_low_stock_threshold: i64,
}

impl<S, A> CatalogService<S, A>
where
    S: CatalogStore,
    A: AuditSink,
{
    pub fn new(store: S, audit: A) -> Self {
        Self {
            store,
            audit,
            dashboard_low_stock_threshold: DEFAULT_DASHBOARD_LOW_STOCK_THRESHOLD,
        }
    }

    /// Override the dashboard's fixed low-stock cutoff.
    pub fn with_dashboard_threshold(mut self, threshold: i64) -> Self {
        self.dashboard_low_stock_threshold = threshold;
        self
    }

    /// All products, ascending by id.
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.store.list().await?)
    }

    /// One product by id.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.store.get(id).await?.ok_or(CatalogError::NotFound)
    }

    /// Batch fetch; missing ids are silently omitted.
    pub async fn get_products_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, CatalogError> {
        Ok(self.store.get_many(ids).await?)
    }

    /// Create a product from a candidate state, assigning a fresh id when
    /// the draft carries none.
    #[instrument(skip(self, draft), err)]
    pub async fn add_product(&self, draft: ProductDraft) -> Result<Product, CatalogError> {
        draft.validate().map_err(invalid)?;
        let id = draft.id.unwrap_or_else(ProductId::new);
        let product = draft.into_product(id).map_err(invalid)?;

        match self.store.create(product).await {
            Ok(created) => Ok(created),
            Err(StoreError::AlreadyExists(id)) => Err(CatalogError::InvalidArgument(format!(
                "product already exists: {id}"
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite the mutable fields of an existing product.
    ///
    /// When the draft changes the stock level, exactly one audit record is
    /// written **before** the store mutation. A rejected audit write
    /// aborts the update with nothing applied.
    #[instrument(skip(self, draft), fields(id = %id), err)]
    pub async fn update_product(
        &self,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Product, CatalogError> {
        if let Some(own) = draft.id {
            if own != id {
                return Err(CatalogError::InvalidArgument(format!(
                    "payload id {own} does not match target id {id}"
                )));
            }
        }
        draft.validate().map_err(invalid)?;

        let existing = self.store.get(id).await?.ok_or(CatalogError::NotFound)?;
        if existing.stock != draft.stock {
            self.audit
                .record_change(StockChange::new(id, existing.stock, draft.stock))
                .await
                .map_err(CatalogError::AuditWriteFailed)?;
        }

        let product = draft.into_product(id).map_err(invalid)?;
        match self.store.update(product).await {
            Ok(updated) => Ok(updated),
            Err(StoreError::NotFound(_)) => Err(CatalogError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a product, returning the removed entity.
    #[instrument(skip(self), fields(id = %id), err)]
    pub async fn remove_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        match self.store.remove(id).await {
            Ok(removed) => Ok(removed),
            Err(StoreError::NotFound(_)) => Err(CatalogError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Every product with `stock <= threshold`, ascending by id.
    ///
    /// An empty result is success, not an error. The threshold here is
    /// caller-supplied and independent of the dashboard's fixed cutoff.
    pub async fn get_low_stock(&self, threshold: i64) -> Result<Vec<Product>, CatalogError> {
        if threshold <= 0 {
            return Err(CatalogError::InvalidArgument(
                "threshold must be greater than zero".to_string(),
            ));
        }
        Ok(self.store.query(ProductFilter::stock_at_most(threshold)).await?)
    }

    /// Reconcile a batch of candidate product states against the store.
    ///
    /// Existing ids are overwritten in place, unseen ids inserted (with
    /// the supplied id, or a fresh one when the draft has none). Duplicate
    /// ids within one batch collapse to the last occurrence before any
    /// diffing, so at most one audit record is written per id and the
    /// stored value is always the last write.
    ///
    /// The commit is all-or-nothing: one batch fetch, audit records for
    /// every stock change written first, then one atomic `upsert_batch`.
    /// Any failure leaves no candidate's change observable and surfaces as
    /// `InvalidArgument` (malformed candidate, before side effects),
    /// `AuditWriteFailed`, or `BatchFailed` carrying the first cause.
    #[instrument(skip(self, candidates), fields(batch_size = candidates.len()), err)]
    pub async fn reconcile_batch(
        &self,
        candidates: Vec<ProductDraft>,
    ) -> Result<Vec<Product>, CatalogError> {
        for draft in &candidates {
            draft.validate().map_err(invalid)?;
        }

        let slots = collapse_candidates(candidates);
        let ids: Vec<ProductId> = slots.iter().map(|(id, _)| *id).collect();

        let existing: HashMap<ProductId, Product> = self
            .store
            .get_many(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut upserts = Vec::with_capacity(slots.len());
        let mut changes = Vec::new();
        for (id, draft) in slots {
            if let Some(prev) = existing.get(&id) {
                if prev.stock != draft.stock {
                    changes.push(StockChange::new(id, prev.stock, draft.stock));
                }
            }
            upserts.push(draft.into_product(id).map_err(invalid)?);
        }

        // Audit-before-commit: a rejected audit write aborts the batch
        // before the store is touched.
        for change in changes {
            self.audit
                .record_change(change)
                .await
                .map_err(CatalogError::AuditWriteFailed)?;
        }

        self.store
            .upsert_batch(upserts)
            .await
            .map_err(CatalogError::BatchFailed)
    }

    /// Aggregate metrics over one consistent read of the catalog.
    pub async fn get_dashboard(&self) -> Result<DashboardSnapshot, CatalogError> {
        let products = self.store.list().await?;
        Ok(DashboardSnapshot::compute(
            products,
            self.dashboard_low_stock_threshold,
        ))
    }
}

fn invalid(err: DomainError) -> CatalogError {
    CatalogError::InvalidArgument(err.to_string())
}

/// Collapse duplicate ids in a candidate batch, last write wins.
///
/// The first occurrence of an id keeps its slot, so the output order is
/// the input order of accepted candidates. Drafts without an id are
/// assigned a fresh one and never collapse with anything.
fn collapse_candidates(candidates: Vec<ProductDraft>) -> Vec<(ProductId, ProductDraft)> {
    let mut slots: Vec<(ProductId, ProductDraft)> = Vec::with_capacity(candidates.len());
    let mut index: HashMap<ProductId, usize> = HashMap::with_capacity(candidates.len());

    for draft in candidates {
        let id = draft.id.unwrap_or_else(ProductId::new);
        match index.get(&id) {
            Some(&slot) => slots[slot].1 = draft,
            None => {
                index.insert(id, slots.len());
                slots.push((id, draft));
            }
        }
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn id_from_byte(n: u8) -> ProductId {
        ProductId::from_uuid(Uuid::from_u128(n as u128 + 1))
    }

    fn draft(id: Option<ProductId>, stock: i64) -> ProductDraft {
        ProductDraft::new(id, "Widget", stock, 100)
    }

    #[test]
    fn collapse_keeps_last_write_in_first_slot() {
        let a = id_from_byte(1);
        let b = id_from_byte(2);
        let collapsed = collapse_candidates(vec![
            draft(Some(a), 1),
            draft(Some(b), 2),
            draft(Some(a), 3),
        ]);

        assert_eq!(collapsed.len(), 2);
        assert_eq!(collapsed[0].0, a);
        assert_eq!(collapsed[0].1.stock, 3);
        assert_eq!(collapsed[1].0, b);
        assert_eq!(collapsed[1].1.stock, 2);
    }

    #[test]
    fn collapse_assigns_fresh_ids_to_anonymous_drafts() {
        let collapsed = collapse_candidates(vec![draft(None, 1), draft(None, 1)]);
        assert_eq!(collapsed.len(), 2);
        assert_ne!(collapsed[0].0, collapsed[1].0);
    }

    proptest! {
        #[test]
        fn collapse_is_last_write_wins_per_id(entries in proptest::collection::vec((0u8..8, 0i64..1000), 0..64)) {
            let candidates: Vec<ProductDraft> = entries
                .iter()
                .map(|&(key, stock)| draft(Some(id_from_byte(key)), stock))
                .collect();

            let collapsed = collapse_candidates(candidates);

            // One slot per distinct id, in first-occurrence order.
            let mut seen = Vec::new();
            for &(key, _) in &entries {
                let id = id_from_byte(key);
                if !seen.contains(&id) {
                    seen.push(id);
                }
            }
            prop_assert_eq!(collapsed.len(), seen.len());
            for (slot, expected_id) in collapsed.iter().zip(&seen) {
                prop_assert_eq!(&slot.0, expected_id);
            }

            // Each slot holds the last-occurring stock for its id.
            for (id, slot_draft) in &collapsed {
                let last = entries
                    .iter()
                    .rev()
                    .find(|&&(key, _)| id_from_byte(key) == *id)
                    .map(|&(_, stock)| stock)
                    .unwrap();
                prop_assert_eq!(slot_draft.stock, last);
            }
        }
    }
}
