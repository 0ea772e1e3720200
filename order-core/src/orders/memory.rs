//! In-memory order line store
//!
//! Same contract as the redb adapter, with a `BTreeMap` behind a mutex in
//! place of the database. Intended for engine tests; the mutex plays the
//! role of the storage transaction, so `apply_updates` keeps its
//! all-or-nothing behavior here too.

use parking_lot::Mutex;
use shared::order::{NewOrderLine, OrderLine};
use std::collections::BTreeMap;

use super::store::{LineUpdate, OrderLineStore, StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    next_id: u64,
    /// Keyed by unique_id; BTreeMap iteration gives ascending fetch order
    lines: BTreeMap<u64, OrderLine>,
}

/// In-memory store for tests
#[derive(Default)]
pub struct MemoryLineStore {
    inner: Mutex<Inner>,
}

impl MemoryLineStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderLineStore for MemoryLineStore {
    fn fetch_lines(&self, order_id: &str) -> StoreResult<Vec<OrderLine>> {
        let inner = self.inner.lock();
        Ok(inner
            .lines
            .values()
            .filter(|l| l.order_id == order_id)
            .cloned()
            .collect())
    }

    fn fetch_line(&self, order_id: &str, item_id: &str) -> StoreResult<Option<OrderLine>> {
        let inner = self.inner.lock();
        Ok(inner
            .lines
            .values()
            .find(|l| l.order_id == order_id && l.item_id == item_id)
            .cloned())
    }

    fn insert_line(&self, line: NewOrderLine) -> StoreResult<OrderLine> {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let unique_id = inner.next_id;

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
        inner.lines.insert(unique_id, row.clone());
        Ok(row)
    }

    fn apply_updates(&self, updates: &[LineUpdate]) -> StoreResult<()> {
        if updates.is_empty() {
            return Ok(());
        }

        let mut inner = self.inner.lock();

        // Two phases: apply every delta to working copies first, write
        // back only when all of them pass.
        let mut staged: Vec<OrderLine> = Vec::with_capacity(updates.len());
        for update in updates {
            let mut line = inner
                .lines
                .get(&update.unique_id)
                .cloned()
                .ok_or(StoreError::LineNotFound(update.unique_id))?;
            update.apply_to(&mut line)?;
            staged.push(line);
        }

        for line in staged {
            inner.lines.insert(line.unique_id, line);
        }
        Ok(())
    }
}
