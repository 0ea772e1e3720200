//! Order line store abstraction
//!
//! The cancellation and settlement logic depends only on the
//! [`OrderLineStore`] trait; `LineStorage` (redb) is the production
//! adapter and `MemoryLineStore` the in-memory fake for tests.
//!
//! `apply_updates` is the sole serialization point for mutations: each
//! adapter re-reads the targeted rows inside one write transaction,
//! applies the deltas to the current values, enforces the row invariants
//! and commits everything or nothing.

use shared::order::{LineStatus, NewOrderLine, OrderLine};
use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Line not found: unique_id={0}")]
    LineNotFound(u64),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Field deltas for one line, committed atomically with its siblings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineUpdate {
    /// Row to update
    pub unique_id: u64,
    /// Replacement status, when the operation transitions the line
    pub set_status: Option<LineStatus>,
    /// Increment for `returned_qty`
    pub add_returned_qty: u32,
    /// Increment for `refund_amount`
    pub add_refund_amount: i64,
}

impl LineUpdate {
    /// Status transition only
    pub fn set_status(unique_id: u64, status: LineStatus) -> Self {
        Self {
            unique_id,
            set_status: Some(status),
            ..Default::default()
        }
    }

    /// Return allocation: bump returned units and the refund total
    pub fn add_return(unique_id: u64, units: u32, refund: i64) -> Self {
        Self {
            unique_id,
            set_status: None,
            add_returned_qty: units,
            add_refund_amount: refund,
        }
    }

    /// Apply this delta to a row, enforcing the row invariants.
    ///
    /// Invariants: `returned_qty` never exceeds `quantity`, the refund
    /// total never decreases, and status only moves along
    /// `Created -> Sent To Fulfillment -> Shipped` or to `Cancelled` from
    /// a non-terminal state. Adapters call this inside their write
    /// transaction so a violating update set aborts whole.
    pub fn apply_to(&self, line: &mut OrderLine) -> StoreResult<()> {
        // Validate everything before touching the row
        if let Some(next) = self.set_status
            && !line.status.can_transition_to(next)
        {
            return Err(StoreError::Constraint(format!(
                "line {}: illegal status transition {} -> {}",
                line.unique_id, line.status, next
            )));
        }
        let returned = line.returned_qty.saturating_add(self.add_returned_qty);
        if returned > line.quantity {
            return Err(StoreError::Constraint(format!(
                "line {}: returned_qty {} would exceed quantity {}",
                line.unique_id, returned, line.quantity
            )));
        }
        if self.add_refund_amount < 0 {
            return Err(StoreError::Constraint(format!(
                "line {}: refund_amount may not decrease",
                line.unique_id
            )));
        }

        if let Some(next) = self.set_status {
            line.status = next;
        }
        line.returned_qty = returned;
        line.refund_amount += self.add_refund_amount;
        Ok(())
    }
}

/// Row-level access to order lines
///
/// Absence of rows is never an error: `fetch_lines` reports an empty
/// sequence and `fetch_line` reports `None`; the caller decides what that
/// means.
pub trait OrderLineStore: Send + Sync {
    /// All lines of an order, `unique_id` ascending.
    ///
    /// The ordering is load-bearing: return settlement processes lines in
    /// exactly this order.
    fn fetch_lines(&self, order_id: &str) -> StoreResult<Vec<OrderLine>>;

    /// A single line by (order, item) pair
    fn fetch_line(&self, order_id: &str, item_id: &str) -> StoreResult<Option<OrderLine>>;

    /// Insert a new line, assigning `unique_id` and `created_timestamp`
    fn insert_line(&self, line: NewOrderLine) -> StoreResult<OrderLine>;

    /// Apply all updates in one atomic unit
    ///
    /// On any failure (missing row, invariant violation, storage error)
    /// nothing is written.
    fn apply_updates(&self, updates: &[LineUpdate]) -> StoreResult<()>;
}
