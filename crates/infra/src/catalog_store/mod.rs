//! Durable keyed storage boundary for the product catalog.
//!
//! This module defines an infrastructure-facing abstraction for storing
//! catalog products without making any storage assumptions. The one hard
//! requirement on implementations is the atomic multi-row commit of
//! [`CatalogStore::upsert_batch`], which the reconciliation engine relies
//! on for its all-or-nothing guarantee.

pub mod in_memory;
pub mod postgres;
pub mod query;
pub mod r#trait;

pub use in_memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;
pub use query::ProductFilter;
pub use r#trait::{CatalogStore, StoreError};
