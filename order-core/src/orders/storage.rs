//! redb-based order line store
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `lines` | `unique_id` | `OrderLine` | Line rows |
//! | `order_index` | `(order_id, unique_id)` | `()` | Ordered per-order lookup |
//! | `counters` | counter name | `u64` | `unique_id` assignment |
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate` by default: once `commit()`
//! returns, the database file is in a consistent state that survives power
//! loss. Dropping an uncommitted write transaction aborts it, which is how
//! `apply_updates` guarantees all-or-nothing behavior.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::order::{NewOrderLine, OrderLine};
use std::path::Path;
use std::sync::Arc;

use super::store::{LineUpdate, OrderLineStore, StoreError, StoreResult};

/// Line rows: key = unique_id, value = JSON-serialized OrderLine
const LINES_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("lines");

/// Per-order index: key = (order_id, unique_id), value = empty
///
/// redb orders composite keys lexicographically, so a range scan over one
/// order_id yields its lines in ascending unique_id order, which is the
/// fetch order settlement depends on.
const ORDER_INDEX_TABLE: TableDefinition<(&str, u64), ()> = TableDefinition::new("order_index");

/// Counter table: key = counter name, value = u64
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

const LINE_ID_KEY: &str = "line_id";

/// Order line store backed by redb
#[derive(Clone)]
pub struct LineStorage {
    db: Arc<Database>,
}

impl LineStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;

        // Initialize tables
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(LINES_TABLE)?;
            let _ = write_txn.open_table(ORDER_INDEX_TABLE)?;

            let mut counters = write_txn.open_table(COUNTERS_TABLE)?;
            if counters.get(LINE_ID_KEY)?.is_none() {
                counters.insert(LINE_ID_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(LINES_TABLE)?;
            let _ = write_txn.open_table(ORDER_INDEX_TABLE)?;
            let mut counters = write_txn.open_table(COUNTERS_TABLE)?;
            counters.insert(LINE_ID_KEY, 0u64)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl OrderLineStore for LineStorage {
    fn fetch_lines(&self, order_id: &str) -> StoreResult<Vec<OrderLine>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(ORDER_INDEX_TABLE)?;
        let lines_table = read_txn.open_table(LINES_TABLE)?;

        let range_start = (order_id, 0u64);
        let range_end = (order_id, u64::MAX);

        let mut lines = Vec::new();
        for entry in index.range(range_start..=range_end)? {
            let (key, _) = entry?;
            let unique_id = key.value().1;
            let row = lines_table
                .get(unique_id)?
                .ok_or(StoreError::LineNotFound(unique_id))?;
            let line: OrderLine = serde_json::from_slice(row.value())?;
            lines.push(line);
        }

        Ok(lines)
    }

    fn fetch_line(&self, order_id: &str, item_id: &str) -> StoreResult<Option<OrderLine>> {
        let lines = self.fetch_lines(order_id)?;
        Ok(lines.into_iter().find(|l| l.item_id == item_id))
    }

    fn insert_line(&self, line: NewOrderLine) -> StoreResult<OrderLine> {
        let write_txn = self.db.begin_write()?;
        let inserted = {
            let mut counters = write_txn.open_table(COUNTERS_TABLE)?;
            let current = counters.get(LINE_ID_KEY)?.map(|g| g.value()).unwrap_or(0);
            let unique_id = current + 1;
            counters.insert(LINE_ID_KEY, unique_id)?;
            drop(counters);

            let row = OrderLine {
                unique_id,
                order_id: line.order_id,
                cust_email: line.cust_email,
                fulfillment_order_id: line.fulfillment_order_id,
                created_timestamp: shared::util::now_iso(),
                item_id: line.item_id,
                item_name: line.item_name,
                quantity: line.quantity,
                status: line.status,
                tracking_nbr: line.tracking_nbr,
                ship_date: line.ship_date,
                unit_price: line.unit_price,
                shipping_price: line.shipping_price,
                discount_applied: line.discount_applied,
                total_price: line.total_price,
                appeasement_applied: line.appeasement_applied,
                returned_qty: 0,
                refund_amount: 0,
            };

            let mut lines_table = write_txn.open_table(LINES_TABLE)?;
            let value = serde_json::to_vec(&row)?;
            lines_table.insert(unique_id, value.as_slice())?;
            drop(lines_table);

            let mut index = write_txn.open_table(ORDER_INDEX_TABLE)?;
            index.insert((row.order_id.as_str(), unique_id), ())?;
            drop(index);

            row
        };
        write_txn.commit()?;

        tracing::debug!(
            unique_id = inserted.unique_id,
            order_id = %inserted.order_id,
            item_id = %inserted.item_id,
            "order line inserted"
        );
        Ok(inserted)
    }

    fn apply_updates(&self, updates: &[LineUpdate]) -> StoreResult<()> {
        if updates.is_empty() {
            return Ok(());
        }

        let write_txn = self.db.begin_write()?;
        {
            let mut lines_table = write_txn.open_table(LINES_TABLE)?;
            for update in updates {
                // Re-read inside the write transaction: deltas apply to the
                // current committed values, and the row invariants are
                // checked against them. Any failure drops the transaction
                // and nothing is written.
                let row = lines_table
                    .get(update.unique_id)?
                    .ok_or(StoreError::LineNotFound(update.unique_id))?;
                let mut line: OrderLine = serde_json::from_slice(row.value())?;
                drop(row);

                update.apply_to(&mut line)?;

                let value = serde_json::to_vec(&line)?;
                lines_table.insert(update.unique_id, value.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::LineStatus;

    fn new_line(order_id: &str, item_id: &str, quantity: u32, status: LineStatus) -> NewOrderLine {
        NewOrderLine {
            order_id: order_id.to_string(),
            cust_email: "test@example.com".to_string(),
            fulfillment_order_id: None,
            item_id: item_id.to_string(),
            item_name: format!("Item {item_id}"),
            quantity,
            status,
            tracking_nbr: None,
            ship_date: None,
            unit_price: 100,
            shipping_price: 10,
            discount_applied: 0,
            total_price: 100 * quantity as i64,
            appeasement_applied: 0,
        }
    }

    #[test]
    fn test_insert_assigns_ascending_ids() {
        let storage = LineStorage::open_in_memory().unwrap();

        let a = storage.insert_line(new_line("ORD-1", "A", 1, LineStatus::Created)).unwrap();
        let b = storage.insert_line(new_line("ORD-1", "B", 1, LineStatus::Created)).unwrap();

        assert!(b.unique_id > a.unique_id);
        assert_eq!(a.returned_qty, 0);
        assert_eq!(a.refund_amount, 0);
        assert!(!a.created_timestamp.is_empty());
    }

    #[test]
    fn test_fetch_lines_ordered_and_scoped() {
        let storage = LineStorage::open_in_memory().unwrap();

        storage.insert_line(new_line("ORD-1", "A", 1, LineStatus::Created)).unwrap();
        storage.insert_line(new_line("ORD-2", "X", 1, LineStatus::Created)).unwrap();
        storage.insert_line(new_line("ORD-1", "B", 1, LineStatus::Created)).unwrap();

        let lines = storage.fetch_lines("ORD-1").unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].unique_id < lines[1].unique_id);
        assert!(lines.iter().all(|l| l.order_id == "ORD-1"));
    }

    #[test]
    fn test_fetch_unknown_order_is_empty() {
        let storage = LineStorage::open_in_memory().unwrap();
        assert!(storage.fetch_lines("ORD-404").unwrap().is_empty());
        assert!(storage.fetch_line("ORD-404", "A").unwrap().is_none());
    }

    #[test]
    fn test_fetch_line_by_item() {
        let storage = LineStorage::open_in_memory().unwrap();
        storage.insert_line(new_line("ORD-1", "A", 1, LineStatus::Created)).unwrap();
        storage.insert_line(new_line("ORD-1", "B", 2, LineStatus::Shipped)).unwrap();

        let line = storage.fetch_line("ORD-1", "B").unwrap().unwrap();
        assert_eq!(line.item_id, "B");
        assert_eq!(line.quantity, 2);

        assert!(storage.fetch_line("ORD-1", "C").unwrap().is_none());
    }

    #[test]
    fn test_apply_updates_commits_all() {
        let storage = LineStorage::open_in_memory().unwrap();
        let a = storage.insert_line(new_line("ORD-1", "A", 5, LineStatus::Shipped)).unwrap();
        let b = storage.insert_line(new_line("ORD-1", "B", 3, LineStatus::Shipped)).unwrap();

        storage
            .apply_updates(&[
                LineUpdate::add_return(a.unique_id, 2, 200),
                LineUpdate::add_return(b.unique_id, 1, 100),
            ])
            .unwrap();

        let lines = storage.fetch_lines("ORD-1").unwrap();
        assert_eq!(lines[0].returned_qty, 2);
        assert_eq!(lines[0].refund_amount, 200);
        assert_eq!(lines[1].returned_qty, 1);
        assert_eq!(lines[1].refund_amount, 100);
    }

    #[test]
    fn test_apply_updates_aborts_whole_set_on_missing_row() {
        let storage = LineStorage::open_in_memory().unwrap();
        let a = storage.insert_line(new_line("ORD-1", "A", 5, LineStatus::Shipped)).unwrap();

        let err = storage
            .apply_updates(&[
                LineUpdate::add_return(a.unique_id, 2, 200),
                LineUpdate::add_return(9999, 1, 100),
            ])
            .unwrap_err();
        assert!(matches!(err, StoreError::LineNotFound(9999)));

        // The first update must not be visible
        let lines = storage.fetch_lines("ORD-1").unwrap();
        assert_eq!(lines[0].returned_qty, 0);
        assert_eq!(lines[0].refund_amount, 0);
    }

    #[test]
    fn test_apply_updates_aborts_whole_set_on_constraint() {
        let storage = LineStorage::open_in_memory().unwrap();
        let a = storage.insert_line(new_line("ORD-1", "A", 5, LineStatus::Shipped)).unwrap();
        let b = storage.insert_line(new_line("ORD-1", "B", 1, LineStatus::Shipped)).unwrap();

        // Second update over-returns line B
        let err = storage
            .apply_updates(&[
                LineUpdate::add_return(a.unique_id, 2, 200),
                LineUpdate::add_return(b.unique_id, 2, 200),
            ])
            .unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));

        let lines = storage.fetch_lines("ORD-1").unwrap();
        assert!(lines.iter().all(|l| l.returned_qty == 0 && l.refund_amount == 0));
    }

    #[test]
    fn test_cancel_transition_guard() {
        let storage = LineStorage::open_in_memory().unwrap();
        let shipped = storage.insert_line(new_line("ORD-1", "A", 1, LineStatus::Shipped)).unwrap();
        let created = storage.insert_line(new_line("ORD-1", "B", 1, LineStatus::Created)).unwrap();

        let err = storage
            .apply_updates(&[LineUpdate::set_status(shipped.unique_id, LineStatus::Cancelled)])
            .unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));

        storage
            .apply_updates(&[LineUpdate::set_status(created.unique_id, LineStatus::Cancelled)])
            .unwrap();
        let line = storage.fetch_line("ORD-1", "B").unwrap().unwrap();
        assert_eq!(line.status, LineStatus::Cancelled);
    }

    #[test]
    fn test_empty_update_set_is_noop() {
        let storage = LineStorage::open_in_memory().unwrap();
        storage.apply_updates(&[]).unwrap();
    }
}
