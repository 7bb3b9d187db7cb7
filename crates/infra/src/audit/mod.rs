//! Append-only sink for stock-change audit records.
//!
//! The core never reads audit records back; the sink's only obligation is
//! that a record accepted here is durable by the time `record_change`
//! returns. Writers follow an audit-before-commit discipline: the record
//! is written before the product mutation it describes becomes visible,
//! so a visible mutation always has its matching record.

pub mod in_memory;
pub mod postgres;

use thiserror::Error;

use stockledger_core::{AuditRecord, StockChange};

/// Audit sink operation error.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The sink's backend rejected the write.
    #[error("audit write failed: {0}")]
    Backend(String),
}

/// Append-only recorder of stock transitions.
#[async_trait::async_trait]
pub trait AuditSink: Send + Sync {
    /// Stamp and append one stock-change record.
    ///
    /// Returns the record as written. Implementations must not dedupe or
    /// drop records; every accepted call is one row.
    async fn record_change(&self, change: StockChange) -> Result<AuditRecord, AuditError>;
}

#[async_trait::async_trait]
impl<A> AuditSink for std::sync::Arc<A>
where
    A: AuditSink + ?Sized,
{
    async fn record_change(&self, change: StockChange) -> Result<AuditRecord, AuditError> {
        (**self).record_change(change).await
    }
}

pub use in_memory::InMemoryAuditSink;
pub use postgres::PostgresAuditSink;
