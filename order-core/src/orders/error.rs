use crate::orders::store::StoreError;
use thiserror::Error;

/// Caller-facing operation errors
///
/// Every variant except `Storage` is a recoverable business outcome,
/// reported before any row is written. Storage failures propagate
/// unchanged and are never retried here; retry policy belongs to the
/// caller.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not cancellable: {0}")]
    NotCancellable(String),

    #[error("No returnable quantity found on this order/line")]
    NoReturnableQuantity,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Result type for order operations
pub type OrderResult<T> = Result<T, OrderError>;
