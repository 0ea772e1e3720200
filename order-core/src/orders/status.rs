//! Aggregate status synthesis
//!
//! An order has no stored status of its own; it is derived on every read
//! from the statuses of its lines.

use shared::order::LineStatus;

/// Synthesize one order-level status from per-line statuses.
///
/// Priority, first match wins:
///
/// 1. any line `Shipped` -> `Shipped`
/// 2. any line `Sent To Fulfillment` -> `Sent To Fulfillment`
/// 3. all lines `Cancelled` -> `Cancelled`
/// 4. all lines `Created` -> `Created`
/// 5. otherwise the first line's status in fetch order
///
/// A single shipped line dominates an otherwise-cancelled order: "has
/// anything gone out the door" outranks "has everything been called off".
/// Rule 5 is a deliberately permissive fallback for mixed states with no
/// defined aggregate, not an error.
///
/// Returns `None` for an empty slice; the service reports that as a
/// missing order before this function is reached.
pub fn synthesize_status(statuses: &[LineStatus]) -> Option<LineStatus> {
    let first = *statuses.first()?;

    if statuses.contains(&LineStatus::Shipped) {
        return Some(LineStatus::Shipped);
    }
    if statuses.contains(&LineStatus::SentToFulfillment) {
        return Some(LineStatus::SentToFulfillment);
    }
    if statuses.iter().all(|s| *s == LineStatus::Cancelled) {
        return Some(LineStatus::Cancelled);
    }
    if statuses.iter().all(|s| *s == LineStatus::Created) {
        return Some(LineStatus::Created);
    }
    Some(first)
}
