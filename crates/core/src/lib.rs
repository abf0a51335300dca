//! Domain building blocks shared by the stockflow crates.
//!
//! Identifiers, money, the shared domain error and the aggregate traits.

pub mod aggregate;
pub mod error;
pub mod id;
pub mod money;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use error::{DomainError, DomainResult};
pub use id::{
    AddressId, CategoryId, CustomerId, OrderId, OrderLineId, PaymentId, ProductId, StockAlertId,
    SupplierId,
};
pub use money::Money;
