//! Infrastructure layer: the transactional store, row locks, and the order
//! placement engine built on them.
//!
//! ## Placement pipeline
//!
//! ```text
//! PlaceOrder
//!   ↓
//! OrderPlacementCoordinator (one UnitOfWork)
//!   ├─ StockLedger       lock row, decrement, snapshot price
//!   ├─ AlertEmitter      stage low-stock alert
//!   ├─ OrderAssembler    stage order + line
//!   └─ PaymentRecorder   stage payment
//!   ↓
//! commit (all or nothing) → EventBus (OrderPlaced)
//! ```

pub mod alerts;
pub mod assembler;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod ledger;
pub mod lock;
pub mod payments;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use alerts::AlertEmitter;
pub use assembler::OrderAssembler;
pub use config::{ConfigError, EngineConfig};
pub use coordinator::{
    ORDER_AGGREGATE_TYPE, OrderPlacementCoordinator, PlaceOrder, PlacedOrder, PlacementState,
};
pub use error::PlacementError;
pub use ledger::{Adjustment, Reservation, StockLedger};
pub use lock::{LockError, RowLockGuard, RowLockTable};
pub use payments::PaymentRecorder;
pub use store::{
    Address, Category, CommitSummary, Customer, Directory, InMemoryStore, StoreError, Supplier,
    UnitOfWork,
};
