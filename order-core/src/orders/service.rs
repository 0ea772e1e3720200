//! OrderService: the operation facade
//!
//! Wires the store, status synthesizer, cancellation validator and
//! settlement engine together. Operations are synchronous and
//! request-scoped: all durable state lives in the line store, and the
//! store's atomic update path is the only way rows change. Concurrent
//! operations against different orders share nothing but the store handle;
//! operations against the same order serialize on the store's write
//! transaction.

use shared::order::{LineStatus, NewOrderLine, OrderLine};
use shared::request::ReturnRequest;
use std::sync::Arc;
use validator::Validate;

use crate::core::Config;

use super::cancel::{plan_cancel_line, plan_cancel_order};
use super::error::{OrderError, OrderResult};
use super::settlement::allocate_return;
use super::status::synthesize_status;
use super::storage::LineStorage;
use super::store::OrderLineStore;

/// Order lifecycle operations over an order line store
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderLineStore>,
}

impl OrderService {
    /// Create a service over an existing store
    pub fn new(store: Arc<dyn OrderLineStore>) -> Self {
        Self { store }
    }

    /// Open a redb-backed service under the configured working directory
    pub fn from_config(config: &Config) -> OrderResult<Self> {
        let path = config.store_path();
        let storage = LineStorage::open(&path)?;
        tracing::info!(path = %path.display(), "order line store opened");
        Ok(Self::new(Arc::new(storage)))
    }

    /// True when at least one line exists for the order
    pub fn order_exists(&self, order_id: &str) -> OrderResult<bool> {
        Ok(!self.store.fetch_lines(order_id)?.is_empty())
    }

    /// All lines of an order, in store fetch order
    ///
    /// An unknown order is an empty vector, not an error; the transport
    /// collaborator decides how to report it.
    pub fn get_order_lines(&self, order_id: &str) -> OrderResult<Vec<OrderLine>> {
        Ok(self.store.fetch_lines(order_id)?)
    }

    /// Insert a new order line (the external creation path)
    pub fn create_order_line(&self, line: NewOrderLine) -> OrderResult<OrderLine> {
        Ok(self.store.insert_line(line)?)
    }

    /// Synthesized order-level status
    pub fn get_order_status(&self, order_id: &str) -> OrderResult<LineStatus> {
        let lines = self.store.fetch_lines(order_id)?;
        let statuses: Vec<LineStatus> = lines.iter().map(|l| l.status).collect();
        synthesize_status(&statuses)
            .ok_or_else(|| OrderError::NotFound(format!("order {order_id} not found")))
    }

    /// Cancel every line of an order, all-or-nothing
    pub fn cancel_order(&self, order_id: &str) -> OrderResult<()> {
        let lines = self.store.fetch_lines(order_id)?;
        if lines.is_empty() {
            return Err(OrderError::NotFound(format!("order {order_id} not found")));
        }

        let updates = plan_cancel_order(&lines)?;
        self.store.apply_updates(&updates)?;

        tracing::info!(order_id = %order_id, lines = updates.len(), "order cancelled");
        Ok(())
    }

    /// Cancel one line by (order, item) pair
    pub fn cancel_order_line(&self, order_id: &str, item_id: &str) -> OrderResult<()> {
        let line = self.store.fetch_line(order_id, item_id)?.ok_or_else(|| {
            OrderError::NotFound(format!("order {order_id} line {item_id} not found"))
        })?;

        let update = plan_cancel_line(&line)?;
        self.store.apply_updates(std::slice::from_ref(&update))?;

        tracing::info!(order_id = %order_id, item_id = %item_id, "order line cancelled");
        Ok(())
    }

    /// Allocate a return, commit the refunds, and report the refreshed
    /// line set for the whole order.
    ///
    /// With `line_item_id` set the return is restricted to that line;
    /// otherwise every line of the order is considered in fetch order.
    pub fn create_return(
        &self,
        order_id: &str,
        request: &ReturnRequest,
    ) -> OrderResult<Vec<OrderLine>> {
        request
            .validate()
            .map_err(|e| OrderError::InvalidArgument(e.to_string()))?;

        let lines = match request.line_item_id.as_deref() {
            Some(item_id) => {
                let line = self.store.fetch_line(order_id, item_id)?.ok_or_else(|| {
                    OrderError::NotFound(format!("order {order_id} line {item_id} not found"))
                })?;
                vec![line]
            }
            None => {
                let lines = self.store.fetch_lines(order_id)?;
                if lines.is_empty() {
                    return Err(OrderError::NotFound(format!("order {order_id} not found")));
                }
                lines
            }
        };

        let updates = allocate_return(&lines, request.return_qty)?;
        self.store.apply_updates(&updates)?;

        tracing::info!(
            order_id = %order_id,
            allocations = updates.len(),
            "return settled"
        );
        self.get_order_lines(order_id)
    }

    /// Current date-time in ISO-8601 (the clock source consumed by the
    /// ticketing collaborator)
    pub fn current_datetime(&self) -> String {
        shared::util::now_iso()
    }
}
