//! Caller-facing error model of the catalog service.

use thiserror::Error;

use stockledger_infra::{AuditError, StoreError};

/// Catalog service error.
///
/// `NotFound` and `InvalidArgument` are detected locally and returned
/// before any side effect. The service never retries internally; retry
/// policy belongs to the caller.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The operation targeted a nonexistent product id.
    #[error("product not found")]
    NotFound,

    /// Malformed input: non-positive threshold, mismatched id between
    /// target and payload, or an invalid candidate.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The atomic commit of a reconciliation batch could not complete.
    /// Nothing was applied; carries the first underlying cause.
    #[error("batch reconciliation failed: {0}")]
    BatchFailed(#[source] StoreError),

    /// The audit sink rejected a write. Under audit-before-commit this
    /// aborts the associated product mutation entirely.
    #[error("audit write failed: {0}")]
    AuditWriteFailed(#[source] AuditError),

    /// A store failure outside the batch commit path.
    #[error(transparent)]
    Store(#[from] StoreError),
}
