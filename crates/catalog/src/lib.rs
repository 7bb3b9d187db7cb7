//! `stockledger-catalog` — the catalog service layer.
//!
//! [`CatalogService`] is the function-level contract an HTTP layer (or any
//! other collaborator) calls into: product CRUD, the low-stock query, the
//! dashboard aggregation, and batch reconciliation with an audit trail of
//! every stock-level change. The service owns no storage itself; it is
//! constructed over a [`stockledger_infra::CatalogStore`] and a
//! [`stockledger_infra::AuditSink`] chosen by the caller at startup.

pub mod dashboard;
pub mod error;
pub mod service;

pub use dashboard::DashboardSnapshot;
pub use error::CatalogError;
pub use service::{CatalogService, DEFAULT_DASHBOARD_LOW_STOCK_THRESHOLD};
