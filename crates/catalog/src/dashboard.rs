//! Catalog-wide aggregate view.

use serde::{Deserialize, Serialize};

use stockledger_core::Product;

/// Consistent point-in-time aggregate over the catalog.
///
/// All three figures are computed from one store read, so they always
/// describe the same snapshot: the count can never disagree with the rows
/// behind the total value or the low-stock subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Number of catalogued products.
    pub total_products: u64,
    /// `Σ stock × price_cents` over all products, in minor currency units.
    pub total_stock_value: u64,
    /// Products at or below the dashboard's low-stock threshold,
    /// ascending by id.
    pub low_stock_products: Vec<Product>,
}

impl DashboardSnapshot {
    /// Aggregate one consistent read of the catalog.
    ///
    /// `products` must already be ordered ascending by id (the store's
    /// `list` contract); the low-stock subset preserves that order.
    pub fn compute(products: Vec<Product>, low_stock_threshold: i64) -> Self {
        let total_products = products.len() as u64;
        let total_stock_value = products.iter().map(Product::stock_value).sum();
        let low_stock_products = products
            .into_iter()
            .filter(|p| p.stock <= low_stock_threshold)
            .collect();

        Self {
            total_products,
            total_stock_value,
            low_stock_products,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockledger_core::ProductId;

    #[test]
    fn compute_aggregates_one_snapshot() {
        let a = Product::new(ProductId::new(), "Bolt", 10, 200).unwrap();
        let b = Product::new(ProductId::new(), "Nut", 3, 500).unwrap();

        let snapshot = DashboardSnapshot::compute(vec![a, b.clone()], 5);
        assert_eq!(snapshot.total_products, 2);
        assert_eq!(snapshot.total_stock_value, 10 * 200 + 3 * 500);
        assert_eq!(snapshot.low_stock_products, vec![b]);
    }

    #[test]
    fn empty_catalog_yields_zeroed_snapshot() {
        let snapshot = DashboardSnapshot::compute(vec![], 10);
        assert_eq!(snapshot.total_products, 0);
        assert_eq!(snapshot.total_stock_value, 0);
        assert!(snapshot.low_stock_products.is_empty());
    }
}
