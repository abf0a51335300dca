use std::time::Duration;

use thiserror::Error;

use stockflow_core::{OrderId, ProductId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    #[error("product {product_id} is locked by another placement (waited {waited:?})")]
    Busy { product_id: ProductId, waited: Duration },

    #[error("product {0} was staged without holding its row lock")]
    NotLocked(ProductId),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("stock for product {product_id} would become negative ({attempted})")]
    NegativeStock { product_id: ProductId, attempted: i64 },

    #[error("order {0} is not part of this unit of work")]
    OrderNotStaged(OrderId),

    #[error("order {0} already has a payment")]
    DuplicatePayment(OrderId),

    #[error("order {0} has no payment")]
    MissingPayment(OrderId),

    #[error("sku {0} already exists")]
    DuplicateSku(String),

    #[error("missing reference: {0}")]
    MissingReference(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("store lock poisoned: {0}")]
    Poisoned(String),
}
