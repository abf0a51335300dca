//! Sales domain module: orders, order lines and payments.
//!
//! Pure domain logic (no IO, no HTTP, no storage). An order is assembled once
//! per placement with a single line whose unit price is a snapshot taken by the
//! stock ledger; exactly one payment is recorded against the order total.

pub mod events;
pub mod order;
pub mod payment;

pub use events::OrderPlaced;
pub use order::{NewOrder, Order, OrderError, OrderLine, OrderStatus};
pub use payment::{Payment, PaymentError, PaymentMethod, PaymentStatus};
