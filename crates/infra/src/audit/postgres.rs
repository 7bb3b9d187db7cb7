//! Postgres-backed audit sink.
//!
//! Appends to the `stock_audit` relation (see
//! `migrations/0001_catalog.sql`). `product_id` carries no foreign key on
//! purpose: audit rows must outlive the product they describe.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, instrument};

use stockledger_core::{AuditRecord, StockChange};

use super::{AuditError, AuditSink};

/// Postgres-backed append-only audit sink.
#[derive(Debug, Clone)]
pub struct PostgresAuditSink {
    pool: Arc<PgPool>,
}

impl PostgresAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl AuditSink for PostgresAuditSink {
    #[instrument(skip(self), fields(product_id = %change.product_id), err)]
    async fn record_change(&self, change: StockChange) -> Result<AuditRecord, AuditError> {
        let record = AuditRecord::stamp(change);

        sqlx::query(
            r#"
            INSERT INTO stock_audit (product_id, old_stock, new_stock, recorded_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.product_id.as_uuid())
        .bind(record.old_stock)
        .bind(record.new_stock)
        .bind(record.recorded_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| AuditError::Backend(format!("insert failed: {e}")))?;

        info!(
            product_id = %record.product_id,
            old_stock = record.old_stock,
            new_stock = record.new_stock,
            "stock change recorded"
        );
        Ok(record)
    }
}
