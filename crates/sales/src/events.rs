//! Integration events for reporting consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockflow_core::{CustomerId, Money, OrderId, PaymentId, ProductId};
use stockflow_events::Event;

use crate::order::{Order, OrderError};
use crate::payment::Payment;

/// Event: OrderPlaced. Published only after the placement committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlaced {
    pub order_id: OrderId,
    pub payment_id: PaymentId,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
    pub total: Money,
    pub occurred_at: DateTime<Utc>,
}

impl OrderPlaced {
    /// Summarise a committed single-line order and its payment.
    pub fn from_committed(order: &Order, payment: &Payment) -> Result<Self, OrderError> {
        let line = order
            .lines()
            .first()
            .ok_or_else(|| OrderError::Validation("order has no lines".into()))?;

        Ok(Self {
            order_id: order.id_typed(),
            payment_id: payment.id,
            customer_id: order.customer_id(),
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
            total: order.total()?,
            occurred_at: order.created_at(),
        })
    }
}

impl Event for OrderPlaced {
    fn event_type(&self) -> &'static str {
        "sales.order.placed"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
