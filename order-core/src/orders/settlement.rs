//! Return allocation and refund computation
//!
//! Allocates a requested return quantity across the eligible lines of an
//! order, in store fetch order, and computes each line's refund net of the
//! proportional share of any appeasement credit already issued against it.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use shared::order::{LineStatus, OrderLine};

use super::error::{OrderError, OrderResult};
use super::store::LineUpdate;

/// Allocate `requested_qty` return units across `lines`.
///
/// `lines` must be in store fetch order (`unique_id` ascending). A line is
/// eligible only while its status is exactly `Shipped` and it has unreturned
/// units left; everything else is skipped without affecting the outcome.
///
/// When a line has fewer remaining units than the working request, the
/// request is clamped down to that remaining count and the clamped value
/// carries forward to every later line: the first insufficient line caps
/// the whole operation. The request is also not consumed by successful
/// allocations: each eligible line receives up to the current working
/// request.
///
/// Errors: `InvalidArgument` when `requested_qty < 1`,
/// `NoReturnableQuantity` when no line allocates. Both are raised before
/// anything is committed; the caller owns the commit.
pub fn allocate_return(lines: &[OrderLine], requested_qty: u32) -> OrderResult<Vec<LineUpdate>> {
    if requested_qty < 1 {
        return Err(OrderError::InvalidArgument(
            "return_qty must be >= 1".to_string(),
        ));
    }

    let mut working_request = requested_qty;
    let mut updates = Vec::new();

    for line in lines {
        let remaining = line.remaining_qty();
        if remaining == 0 || line.status != LineStatus::Shipped {
            tracing::debug!(
                unique_id = line.unique_id,
                remaining,
                status = %line.status,
                "line skipped for return"
            );
            continue;
        }

        if working_request > remaining {
            working_request = remaining;
        }
        let units = remaining.min(working_request);
        let refund = refund_increment(line, units);

        tracing::debug!(
            unique_id = line.unique_id,
            units,
            refund,
            "return allocated on line"
        );
        updates.push(LineUpdate::add_return(line.unique_id, units, refund));
    }

    if updates.is_empty() {
        return Err(OrderError::NoReturnableQuantity);
    }
    Ok(updates)
}

/// Refund for returning `units` from `line`:
/// `floor(unit_price * units - appeasement_per_unit * units)` where
/// `appeasement_per_unit = appeasement_applied / quantity` (0 for a
/// zero-quantity line).
///
/// The per-unit appeasement share keeps a line from being refunded twice
/// for value already credited against it. Truncation favors the house by
/// at most one currency unit per allocation.
fn refund_increment(line: &OrderLine, units: u32) -> i64 {
    let units = Decimal::from(units);
    let appeasement_per_unit = if line.quantity > 0 {
        Decimal::from(line.appeasement_applied) / Decimal::from(line.quantity)
    } else {
        Decimal::ZERO
    };

    let refund = Decimal::from(line.unit_price) * units - appeasement_per_unit * units;
    refund.floor().to_i64().unwrap_or_default()
}
