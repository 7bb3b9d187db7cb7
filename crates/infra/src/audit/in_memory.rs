use std::sync::RwLock;

use tracing::info;

use stockledger_core::{AuditRecord, StockChange};

use super::{AuditError, AuditSink};

/// In-memory audit sink.
///
/// Intended for tests/dev. Keeps every record in insertion order and
/// exposes them through [`InMemoryAuditSink::records`] so tests can assert
/// the exactly-once property.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    records: RwLock<Vec<AuditRecord>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, in insertion order.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .read()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn record_change(&self, change: StockChange) -> Result<AuditRecord, AuditError> {
        let record = AuditRecord::stamp(change);
        let mut records = self
            .records
            .write()
            .map_err(|_| AuditError::Backend("lock poisoned".to_string()))?;
        records.push(record.clone());
        info!(
            product_id = %record.product_id,
            old_stock = record.old_stock,
            new_stock = record.new_stock,
            "stock change recorded"
        );
        Ok(record)
    }
}
