//! Order Lifecycle & Return Settlement
//!
//! This module implements the order engine:
//!
//! - **store**: the order line store abstraction (repository trait)
//! - **storage**: redb-backed store adapter
//! - **memory**: in-memory store adapter, for tests
//! - **status**: aggregate status synthesis
//! - **cancel**: cancellation validation
//! - **settlement**: return allocation and refund computation
//! - **service**: the operation facade exposed to the transport collaborator
//!
//! # Operation Flow
//!
//! 1. The caller supplies an order id (and, for returns, an optional line
//!    item id and a quantity)
//! 2. `OrderService` fetches the relevant line(s) from the store
//! 3. The pure planning layer (status/cancel/settlement) validates the
//!    operation and produces a set of `LineUpdate`s
//! 4. The store commits all updates in one atomic unit, or none at all
//! 5. The outcome (or the refreshed line set) is returned to the caller

pub mod cancel;
pub mod error;
pub mod memory;
pub mod service;
pub mod settlement;
pub mod status;
pub mod storage;
pub mod store;

// Re-exports
pub use error::{OrderError, OrderResult};
pub use memory::MemoryLineStore;
pub use service::OrderService;
pub use settlement::allocate_return;
pub use status::synthesize_status;
pub use storage::LineStorage;
pub use store::{LineUpdate, OrderLineStore, StoreError, StoreResult};
