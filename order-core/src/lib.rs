//! Order Lifecycle & Return Settlement Engine
//!
//! Coordinates customer order records across their lifecycle: status
//! aggregation, cancellation, and return/refund settlement. All durable
//! state lives in the order line store; the engine itself is stateless
//! between operations.
//!
//! # Module structure
//!
//! ```text
//! order-core/src/
//! ├── core/          # Configuration
//! ├── orders/        # Store, status synthesis, cancellation, settlement
//! └── utils/         # Logging
//! ```
//!
//! # Operation Flow
//!
//! ```text
//! OrderService operation
//!     ├─ 1. Fetch line(s) from the store
//!     ├─ 2. Validate / plan (status, cancel, settlement)
//!     ├─ 3. Commit the planned updates atomically
//!     └─ 4. Return the outcome (or refreshed line set)
//! ```

pub mod core;
pub mod orders;
pub mod utils;

// Re-export public types
pub use crate::core::Config;
pub use orders::{
    LineStorage, LineUpdate, MemoryLineStore, OrderError, OrderLineStore, OrderResult,
    OrderService, StoreError, StoreResult,
};
pub use utils::logger::{init_logger, init_logger_with_file};
