//! Request payloads accepted from the transport collaborator

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Create-return payload.
///
/// `line_item_id` restricts the return to a single line; when absent, every
/// line of the order is considered in store fetch order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReturnRequest {
    pub line_item_id: Option<String>,
    /// Units to return (default 1)
    #[serde(default = "default_return_qty")]
    #[validate(range(min = 1, message = "return_qty must be >= 1"))]
    pub return_qty: u32,
}

fn default_return_qty() -> u32 {
    1
}

impl Default for ReturnRequest {
    fn default() -> Self {
        Self {
            line_item_id: None,
            return_qty: 1,
        }
    }
}

impl ReturnRequest {
    /// Return against the whole order
    pub fn whole_order(return_qty: u32) -> Self {
        Self {
            line_item_id: None,
            return_qty,
        }
    }

    /// Return against a single line
    pub fn line(item_id: impl Into<String>, return_qty: u32) -> Self {
        Self {
            line_item_id: Some(item_id.into()),
            return_qty,
        }
    }
}
