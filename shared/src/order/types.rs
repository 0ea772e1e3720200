//! Order line record and status types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// Line Status
// =============================================================================

/// Per-line fulfillment status.
///
/// Closed set: the wire strings below are the only recognized values.
/// Anything else fails at the serialization boundary instead of falling
/// through status checks downstream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum LineStatus {
    /// Order line accepted, not yet handed to fulfillment
    #[default]
    Created,
    /// Handed to the fulfillment system, not yet shipped
    #[serde(rename = "Sent To Fulfillment")]
    SentToFulfillment,
    /// Left the warehouse; terminal for cancellation, required for returns
    Shipped,
    /// Called off; terminal
    Cancelled,
}

impl LineStatus {
    /// Wire representation, matching the stored status strings
    pub fn as_str(&self) -> &'static str {
        match self {
            LineStatus::Created => "Created",
            LineStatus::SentToFulfillment => "Sent To Fulfillment",
            LineStatus::Shipped => "Shipped",
            LineStatus::Cancelled => "Cancelled",
        }
    }

    /// Terminal states block cancellation
    pub fn is_terminal(&self) -> bool {
        matches!(self, LineStatus::Shipped | LineStatus::Cancelled)
    }

    /// Legal status transitions: `Created -> Sent To Fulfillment -> Shipped`,
    /// plus any non-terminal state `-> Cancelled`.
    pub fn can_transition_to(&self, next: LineStatus) -> bool {
        match (self, next) {
            (LineStatus::Created, LineStatus::SentToFulfillment) => true,
            (LineStatus::SentToFulfillment, LineStatus::Shipped) => true,
            (current, LineStatus::Cancelled) => !current.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for LineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized status string
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unrecognized line status: {0}")]
pub struct ParseLineStatusError(pub String);

impl FromStr for LineStatus {
    type Err = ParseLineStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(LineStatus::Created),
            "Sent To Fulfillment" => Ok(LineStatus::SentToFulfillment),
            "Shipped" => Ok(LineStatus::Shipped),
            "Cancelled" => Ok(LineStatus::Cancelled),
            other => Err(ParseLineStatusError(other.to_string())),
        }
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// One (order, item) record; the atomic unit of quantity/status/refund
/// tracking.
///
/// Monetary fields are integer currency units. Only `status`,
/// `returned_qty` and `refund_amount` are mutated after creation, and only
/// through the store's atomic update path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    /// Store-assigned identity; sole write target for row-level updates
    pub unique_id: u64,
    /// Groups lines into a logical order; not unique alone
    pub order_id: String,
    pub cust_email: String,
    pub fulfillment_order_id: Option<String>,
    /// ISO-8601, stamped by the store at insert
    pub created_timestamp: String,
    pub item_id: String,
    pub item_name: String,
    /// Ordered quantity; immutable after creation
    pub quantity: u32,
    pub status: LineStatus,
    pub tracking_nbr: Option<String>,
    pub ship_date: Option<String>,
    pub unit_price: i64,
    pub shipping_price: i64,
    pub discount_applied: i64,
    pub total_price: i64,
    /// Goodwill credit already issued against the whole line (not per unit)
    pub appeasement_applied: i64,
    /// Cumulative units returned; invariant `returned_qty <= quantity`
    pub returned_qty: u32,
    /// Cumulative refund issued; only grows through settlement
    pub refund_amount: i64,
}

impl OrderLine {
    /// Units still available for return
    pub fn remaining_qty(&self) -> u32 {
        self.quantity.saturating_sub(self.returned_qty)
    }
}

/// Payload for inserting a new order line.
///
/// Identity and bookkeeping fields (`unique_id`, `created_timestamp`,
/// `returned_qty`, `refund_amount`) are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderLine {
    pub order_id: String,
    pub cust_email: String,
    pub fulfillment_order_id: Option<String>,
    pub item_id: String,
    pub item_name: String,
    pub quantity: u32,
    #[serde(default)]
    pub status: LineStatus,
    pub tracking_nbr: Option<String>,
    pub ship_date: Option<String>,
    pub unit_price: i64,
    pub shipping_price: i64,
    pub discount_applied: i64,
    pub total_price: i64,
    pub appeasement_applied: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_strings() {
        assert_eq!(
            serde_json::to_string(&LineStatus::SentToFulfillment).unwrap(),
            "\"Sent To Fulfillment\""
        );
        assert_eq!(serde_json::to_string(&LineStatus::Shipped).unwrap(), "\"Shipped\"");

        let parsed: LineStatus = serde_json::from_str("\"Cancelled\"").unwrap();
        assert_eq!(parsed, LineStatus::Cancelled);
    }

    #[test]
    fn test_unknown_status_rejected() {
        let result: Result<LineStatus, _> = serde_json::from_str("\"Backordered\"");
        assert!(result.is_err(), "unknown status must not deserialize");

        assert_eq!(
            "Backordered".parse::<LineStatus>(),
            Err(ParseLineStatusError("Backordered".to_string()))
        );
    }

    #[test]
    fn test_from_str_round_trip() {
        for status in [
            LineStatus::Created,
            LineStatus::SentToFulfillment,
            LineStatus::Shipped,
            LineStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<LineStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(LineStatus::Shipped.is_terminal());
        assert!(LineStatus::Cancelled.is_terminal());
        assert!(!LineStatus::Created.is_terminal());
        assert!(!LineStatus::SentToFulfillment.is_terminal());
    }

    #[test]
    fn test_transitions() {
        assert!(LineStatus::Created.can_transition_to(LineStatus::SentToFulfillment));
        assert!(LineStatus::SentToFulfillment.can_transition_to(LineStatus::Shipped));
        assert!(LineStatus::Created.can_transition_to(LineStatus::Cancelled));
        assert!(LineStatus::SentToFulfillment.can_transition_to(LineStatus::Cancelled));

        // Terminal states never move again
        assert!(!LineStatus::Shipped.can_transition_to(LineStatus::Cancelled));
        assert!(!LineStatus::Cancelled.can_transition_to(LineStatus::Cancelled));
        assert!(!LineStatus::Cancelled.can_transition_to(LineStatus::Created));

        // No skipping forward
        assert!(!LineStatus::Created.can_transition_to(LineStatus::Shipped));
    }

    #[test]
    fn test_remaining_qty() {
        let line = OrderLine {
            unique_id: 1,
            order_id: "ORD-001".to_string(),
            cust_email: "a@example.com".to_string(),
            fulfillment_order_id: None,
            created_timestamp: "2025-01-01T00:00:00Z".to_string(),
            item_id: "ITEM-1".to_string(),
            item_name: "Widget".to_string(),
            quantity: 5,
            status: LineStatus::Shipped,
            tracking_nbr: None,
            ship_date: None,
            unit_price: 100,
            shipping_price: 0,
            discount_applied: 0,
            total_price: 500,
            appeasement_applied: 0,
            returned_qty: 3,
            refund_amount: 300,
        };
        assert_eq!(line.remaining_qty(), 2);
    }
}
