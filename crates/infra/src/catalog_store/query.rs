//! Typed predicate for catalog queries.
//!
//! Keeps the query surface declarative so every implementation (in-memory
//! scan, SQL WHERE clause) can evaluate the same filter.

use serde::{Deserialize, Serialize};

use stockledger_core::Product;

/// Filter criteria for [`super::CatalogStore::query`].
///
/// The empty filter (`Default`) matches every product.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Keep only products with `stock <= stock_at_most` (the low-stock
    /// predicate).
    pub stock_at_most: Option<i64>,
}

impl ProductFilter {
    /// The low-stock predicate: `stock <= threshold`.
    pub fn stock_at_most(threshold: i64) -> Self {
        Self {
            stock_at_most: Some(threshold),
        }
    }

    /// Evaluate the filter against a single product.
    pub fn matches(&self, product: &Product) -> bool {
        match self.stock_at_most {
            Some(threshold) => product.stock <= threshold,
            None => true,
        }
    }
}
