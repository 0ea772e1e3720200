//! Cancellation validation
//!
//! The same rule at two granularities: an order cancels only if every line
//! is still cancellable, a single line only if it is itself cancellable.
//! Cancellation is a one-way transition guarded at the boundary:
//! cancelling an already-cancelled target reports `NotCancellable`, never
//! a silent success.

use shared::order::{LineStatus, OrderLine};

use super::error::{OrderError, OrderResult};
use super::store::LineUpdate;

/// Plan cancelling a whole order.
///
/// All-or-nothing: one shipped or already-cancelled line blocks cancelling
/// the rest. On success every line moves to `Cancelled`.
pub fn plan_cancel_order(lines: &[OrderLine]) -> OrderResult<Vec<LineUpdate>> {
    if lines.is_empty() {
        return Err(OrderError::NotFound("order has no lines".to_string()));
    }

    if let Some(blocking) = lines.iter().find(|l| l.status.is_terminal()) {
        return Err(OrderError::NotCancellable(format!(
            "line {} is {}; an order with shipped or already-cancelled lines cannot be cancelled",
            blocking.item_id, blocking.status
        )));
    }

    Ok(lines
        .iter()
        .map(|l| LineUpdate::set_status(l.unique_id, LineStatus::Cancelled))
        .collect())
}

/// Plan cancelling a single line.
pub fn plan_cancel_line(line: &OrderLine) -> OrderResult<LineUpdate> {
    if line.status.is_terminal() {
        return Err(OrderError::NotCancellable(format!(
            "line {} is {} and not in a cancellable state",
            line.item_id, line.status
        )));
    }
    Ok(LineUpdate::set_status(line.unique_id, LineStatus::Cancelled))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(unique_id: u64, item_id: &str, status: LineStatus) -> OrderLine {
        OrderLine {
            unique_id,
            order_id: "ORD-1".to_string(),
            cust_email: "test@example.com".to_string(),
            fulfillment_order_id: None,
            created_timestamp: "2025-01-01T00:00:00Z".to_string(),
            item_id: item_id.to_string(),
            item_name: format!("Item {item_id}"),
            quantity: 1,
            status,
            tracking_nbr: None,
            ship_date: None,
            unit_price: 100,
            shipping_price: 0,
            discount_applied: 0,
            total_price: 100,
            appeasement_applied: 0,
            returned_qty: 0,
            refund_amount: 0,
        }
    }

    #[test]
    fn test_cancel_order_success() {
        let lines = vec![
            line(1, "A", LineStatus::Created),
            line(2, "B", LineStatus::SentToFulfillment),
        ];

        let updates = plan_cancel_order(&lines).unwrap();
        assert_eq!(updates.len(), 2);
        assert!(updates
            .iter()
            .all(|u| u.set_status == Some(LineStatus::Cancelled)));
        assert_eq!(updates[0].unique_id, 1);
        assert_eq!(updates[1].unique_id, 2);
    }

    #[test]
    fn test_one_shipped_line_blocks_whole_order() {
        let lines = vec![
            line(1, "A", LineStatus::Created),
            line(2, "B", LineStatus::Shipped),
        ];
        assert!(matches!(
            plan_cancel_order(&lines),
            Err(OrderError::NotCancellable(_))
        ));
    }

    #[test]
    fn test_one_cancelled_line_blocks_whole_order() {
        let lines = vec![
            line(1, "A", LineStatus::Cancelled),
            line(2, "B", LineStatus::Created),
        ];
        assert!(matches!(
            plan_cancel_order(&lines),
            Err(OrderError::NotCancellable(_))
        ));
    }

    #[test]
    fn test_cancel_empty_order_not_found() {
        assert!(matches!(plan_cancel_order(&[]), Err(OrderError::NotFound(_))));
    }

    #[test]
    fn test_cancel_line_success() {
        let update = plan_cancel_line(&line(7, "A", LineStatus::SentToFulfillment)).unwrap();
        assert_eq!(update, LineUpdate::set_status(7, LineStatus::Cancelled));
    }

    #[test]
    fn test_cancel_line_terminal_states_rejected() {
        for status in [LineStatus::Shipped, LineStatus::Cancelled] {
            assert!(matches!(
                plan_cancel_line(&line(7, "A", status)),
                Err(OrderError::NotCancellable(_))
            ));
        }
    }
}
