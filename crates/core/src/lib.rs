//! `stockledger-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** types (no infrastructure concerns):
//! the product entity, externally supplied candidate states, stock-change
//! facts, and the domain error model.

pub mod audit;
pub mod error;
pub mod id;
pub mod product;

pub use audit::{AuditRecord, StockChange};
pub use error::{DomainError, DomainResult};
pub use id::ProductId;
pub use product::{Product, ProductDraft};
