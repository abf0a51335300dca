//! Order Assembler: builds the order header and its single line.

use tracing::debug;

use stockflow_core::OrderId;
use stockflow_sales::{NewOrder, Order, OrderError};

use crate::error::PlacementError;
use crate::store::{Directory, UnitOfWork};

#[derive(Debug, Clone)]
pub struct OrderAssembler<D> {
    directory: D,
}

impl<D: Directory> OrderAssembler<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    /// Stage a `Pending` order. `request.unit_price` is the reservation's
    /// snapshot; the product row is never re-read here.
    pub fn create_order(
        &self,
        uow: &mut UnitOfWork<'_>,
        request: NewOrder,
    ) -> Result<OrderId, PlacementError> {
        if request.quantity == 0 {
            return Err(OrderError::InvalidQuantity.into());
        }

        let owned = self
            .directory
            .address_belongs_to_customer(request.shipping_address_id, request.customer_id)?;
        if !owned {
            return Err(OrderError::InvalidAddress {
                address_id: request.shipping_address_id,
                customer_id: request.customer_id,
            }
            .into());
        }

        let order = Order::place(request)?;
        let order_id = order.id_typed();
        debug!(%order_id, "order staged");
        uow.stage_order(order);
        Ok(order_id)
    }
}
