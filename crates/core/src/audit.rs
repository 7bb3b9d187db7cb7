use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::ProductId;

/// A stock-level transition as observed by a writer, before it is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockChange {
    pub product_id: ProductId,
    pub old_stock: i64,
    pub new_stock: i64,
}

impl StockChange {
    pub fn new(product_id: ProductId, old_stock: i64, new_stock: i64) -> Self {
        Self {
            product_id,
            old_stock,
            new_stock,
        }
    }
}

/// Immutable fact describing one recorded stock transition.
///
/// `product_id` is a weak reference: the product may later be deleted
/// without invalidating historical records. Records are append-only and
/// never mutated or deleted by this subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub product_id: ProductId,
    pub old_stock: i64,
    pub new_stock: i64,
    /// Stamped by the recorder at write time.
    pub recorded_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Stamp a change with the current time.
    pub fn stamp(change: StockChange) -> Self {
        Self {
            product_id: change.product_id,
            old_stock: change.old_stock,
            new_stock: change.new_stock,
            recorded_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_carries_the_change_fields() {
        let change = StockChange::new(ProductId::new(), 10, 4);
        let record = AuditRecord::stamp(change);
        assert_eq!(record.product_id, change.product_id);
        assert_eq!(record.old_stock, 10);
        assert_eq!(record.new_stock, 4);
    }
}
