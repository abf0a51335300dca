//! Payment Recorder.

use chrono::{DateTime, Utc};
use tracing::debug;

use stockflow_core::{Money, OrderId, PaymentId};
use stockflow_sales::{Payment, PaymentMethod};

use crate::error::PlacementError;
use crate::store::{StoreError, UnitOfWork};

#[derive(Debug, Default, Clone, Copy)]
pub struct PaymentRecorder;

impl PaymentRecorder {
    pub fn new() -> Self {
        Self
    }

    /// Stage a `Pending` payment for an order staged in the same unit.
    ///
    /// `amount` defaults to the order total; when given it must match exactly.
    pub fn record_payment(
        &self,
        uow: &mut UnitOfWork<'_>,
        order_id: OrderId,
        method: PaymentMethod,
        amount: Option<Money>,
        paid_at: DateTime<Utc>,
    ) -> Result<PaymentId, PlacementError> {
        let order = uow
            .staged_order(order_id)
            .ok_or(StoreError::OrderNotStaged(order_id))?;
        let amount = match amount {
            Some(a) => a,
            None => order.total()?,
        };

        let payment = Payment::record(order, method, amount, paid_at)?;
        let payment_id = payment.id;
        debug!(%order_id, %payment_id, %amount, %method, "payment staged");
        uow.stage_payment(payment);
        Ok(payment_id)
    }
}
