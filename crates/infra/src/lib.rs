//! Infrastructure layer: storage adapters behind capability interfaces.
//!
//! Two boundaries live here: the [`catalog_store::CatalogStore`] (durable
//! keyed storage of products) and the [`audit::AuditSink`] (append-only
//! sink of stock-change records). Each ships an in-memory implementation
//! for tests/dev and a Postgres implementation for production. Callers
//! pick the implementation at startup; nothing here is process-global.

pub mod audit;
pub mod catalog_store;

pub use audit::{AuditError, AuditSink, InMemoryAuditSink, PostgresAuditSink};
pub use catalog_store::{
    CatalogStore, InMemoryCatalogStore, PostgresCatalogStore, ProductFilter, StoreError,
};
