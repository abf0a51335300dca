use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockflow_core::{AddressId, CustomerId, Money, OrderId, OrderLineId, ProductId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("quantity must be positive")]
    InvalidQuantity,

    /// The shipping address is unknown or belongs to another customer.
    #[error("address {address_id} does not belong to customer {customer_id}")]
    InvalidAddress {
        address_id: AddressId,
        customer_id: CustomerId,
    },

    #[error("validation failed: {0}")]
    Validation(String),
}

/// Order status lifecycle. Placement always starts at `Pending`; later
/// transitions belong to fulfillment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Canceled,
}

/// Order line: product, quantity, unit price captured at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderLine {
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// Input for [`Order::place`]. `unit_price` comes from the stock reservation,
/// never from a fresh product read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub shipping_address_id: AddressId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
    pub created_at: DateTime<Utc>,
}

/// Order header plus its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    created_at: DateTime<Utc>,
    customer_id: CustomerId,
    shipping_address_id: AddressId,
    status: OrderStatus,
    lines: Vec<OrderLine>,
}

impl Order {
    /// Build a `Pending` order with a single line.
    pub fn place(new: NewOrder) -> Result<Self, OrderError> {
        if new.quantity == 0 {
            return Err(OrderError::InvalidQuantity);
        }
        if new.unit_price.is_zero() {
            return Err(OrderError::Validation("unit_price must be positive".into()));
        }

        let id = OrderId::new();
        let line = OrderLine {
            id: OrderLineId::new(),
            order_id: id,
            product_id: new.product_id,
            quantity: new.quantity,
            unit_price: new.unit_price,
        };
        if line.line_total().is_none() {
            return Err(OrderError::Validation("line total overflows".into()));
        }

        Ok(Self {
            id,
            created_at: new.created_at,
            customer_id: new.customer_id,
            shipping_address_id: new.shipping_address_id,
            status: OrderStatus::Pending,
            lines: vec![line],
        })
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn shipping_address_id(&self) -> AddressId {
        self.shipping_address_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Σ(quantity × unit_price) over all lines.
    pub fn total(&self) -> Result<Money, OrderError> {
        self.lines.iter().try_fold(Money::ZERO, |acc, line| {
            line.line_total()
                .and_then(|t| acc.checked_add(t))
                .ok_or_else(|| OrderError::Validation("order total overflows".into()))
        })
    }
}
