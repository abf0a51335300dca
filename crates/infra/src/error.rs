//! Errors surfaced by order placement.

use thiserror::Error;

use stockflow_core::{AddressId, CustomerId, DomainError, Money, ProductId};
use stockflow_inventory::StockError;
use stockflow_sales::{OrderError, PaymentError};

use crate::store::StoreError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: i64 },

    /// Internal: the insufficient-stock check should make this unreachable.
    #[error("stock for product {product_id} would become negative ({attempted})")]
    NegativeStockViolation { product_id: ProductId, attempted: i64 },

    #[error("address {address_id} does not belong to customer {customer_id}")]
    InvalidAddress {
        address_id: AddressId,
        customer_id: CustomerId,
    },

    #[error("payment amount {actual} does not match order total {expected}")]
    AmountMismatch { expected: Money, actual: Money },

    /// The product's row lock was not acquired in time.
    #[error("product {0} is busy, try again")]
    Busy(ProductId),

    #[error("validation failed: {0}")]
    Validation(String),

    /// Internal: a row changed under a held lock.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal: storage failure (poisoned lock, broken reference).
    #[error("store failure: {0}")]
    Store(String),
}

impl PlacementError {
    /// Failures that indicate a bug or a broken store rather than a rejected request.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            PlacementError::NegativeStockViolation { .. }
                | PlacementError::Conflict(_)
                | PlacementError::Store(_)
        )
    }

    /// Stable machine-readable name.
    pub fn kind(&self) -> &'static str {
        match self {
            PlacementError::ProductNotFound(_) => "product_not_found",
            PlacementError::InsufficientStock { .. } => "insufficient_stock",
            PlacementError::NegativeStockViolation { .. } => "negative_stock_violation",
            PlacementError::InvalidAddress { .. } => "invalid_address",
            PlacementError::AmountMismatch { .. } => "amount_mismatch",
            PlacementError::Busy(_) => "busy",
            PlacementError::Validation(_) => "validation",
            PlacementError::Conflict(_) => "conflict",
            PlacementError::Store(_) => "store",
        }
    }
}

impl From<StoreError> for PlacementError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::ProductNotFound(id) => PlacementError::ProductNotFound(id),
            StoreError::Busy { product_id, .. } => PlacementError::Busy(product_id),
            StoreError::Conflict(msg) => PlacementError::Conflict(msg),
            StoreError::NegativeStock {
                product_id,
                attempted,
            } => PlacementError::NegativeStockViolation {
                product_id,
                attempted,
            },
            StoreError::DuplicateSku(_)
            | StoreError::MissingReference(_)
            | StoreError::InvalidRecord(_) => PlacementError::Validation(value.to_string()),
            other => PlacementError::Store(other.to_string()),
        }
    }
}

impl From<StockError> for PlacementError {
    fn from(value: StockError) -> Self {
        match value {
            StockError::InvalidQuantity => PlacementError::Validation(value.to_string()),
            StockError::InsufficientStock {
                requested,
                available,
            } => PlacementError::InsufficientStock {
                requested,
                available,
            },
            StockError::NegativeStock {
                product_id,
                attempted,
            } => PlacementError::NegativeStockViolation {
                product_id,
                attempted,
            },
            StockError::Validation(msg) => PlacementError::Validation(msg),
            StockError::InvariantViolation(msg) => PlacementError::Store(msg),
        }
    }
}

impl From<OrderError> for PlacementError {
    fn from(value: OrderError) -> Self {
        match value {
            OrderError::InvalidQuantity => PlacementError::Validation(value.to_string()),
            OrderError::InvalidAddress {
                address_id,
                customer_id,
            } => PlacementError::InvalidAddress {
                address_id,
                customer_id,
            },
            OrderError::Validation(msg) => PlacementError::Validation(msg),
        }
    }
}

impl From<PaymentError> for PlacementError {
    fn from(value: PaymentError) -> Self {
        match value {
            PaymentError::AmountMismatch { expected, actual } => {
                PlacementError::AmountMismatch { expected, actual }
            }
            PaymentError::ZeroAmount => PlacementError::Validation(value.to_string()),
            PaymentError::Order(e) => e.into(),
        }
    }
}

impl From<DomainError> for PlacementError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::VersionConflict { .. } => PlacementError::Conflict(value.to_string()),
            DomainError::Validation(msg) => PlacementError::Validation(msg),
            DomainError::InvalidId(msg) => PlacementError::Validation(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn lock_timeout_maps_to_busy() {
        let id = ProductId::new();
        let err: PlacementError = StoreError::Busy {
            product_id: id,
            waited: Duration::from_millis(5),
        }
        .into();

        assert_eq!(err, PlacementError::Busy(id));
        assert_eq!(err.kind(), "busy");
        assert!(!err.is_internal());
    }

    #[test]
    fn negative_stock_is_internal_from_either_layer() {
        let product_id = ProductId::new();
        let from_store: PlacementError = StoreError::NegativeStock {
            product_id,
            attempted: -2,
        }
        .into();
        let from_domain: PlacementError = StockError::NegativeStock {
            product_id,
            attempted: -2,
        }
        .into();

        assert_eq!(from_store, from_domain);
        assert!(from_store.is_internal());
    }

    #[test]
    fn payment_errors_keep_their_amounts() {
        let err: PlacementError = PaymentError::AmountMismatch {
            expected: Money::from_cents(1_000),
            actual: Money::from_cents(999),
        }
        .into();

        assert_eq!(err.kind(), "amount_mismatch");
        assert_eq!(
            err.to_string(),
            "payment amount 9.99 does not match order total 10.00"
        );
    }

    #[test]
    fn poisoned_store_is_internal() {
        let err: PlacementError = StoreError::Poisoned("tables".into()).into();
        assert_eq!(err.kind(), "store");
        assert!(err.is_internal());
    }
}
