//! Stock Ledger: the only writer of stock quantity.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use stockflow_core::{Aggregate, Money, ProductId};
use stockflow_inventory::{ChangePrice, DecrementStock, Product, Restock, StockCommand, StockEvent};

use crate::error::PlacementError;
use crate::store::UnitOfWork;

/// Result of a successful stock reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    /// Row as staged, after the decrement.
    pub product: Product,
    /// Price snapshot for the order line.
    pub unit_price: Money,
    pub previous_quantity: i64,
    pub new_quantity: i64,
    pub event: StockEvent,
}

/// A staged stock or price change that did not come from a sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjustment {
    pub product: Product,
    pub event: Option<StockEvent>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StockLedger;

impl StockLedger {
    pub fn new() -> Self {
        Self
    }

    /// Lock the row, decide, apply, and stage the decremented row.
    ///
    /// The row lock taken here is held by `uow` until it commits or drops.
    pub fn reserve_and_decrement(
        &self,
        uow: &mut UnitOfWork<'_>,
        product_id: ProductId,
        quantity: u32,
        occurred_at: DateTime<Utc>,
    ) -> Result<Reservation, PlacementError> {
        if quantity == 0 {
            return Err(PlacementError::Validation("quantity must be positive".into()));
        }

        let product = uow.lock_product(product_id)?;
        let command = StockCommand::Decrement(DecrementStock {
            product_id,
            quantity,
            occurred_at,
        });
        let (product, events) = Self::decide(product, &command)?;

        let event = events
            .into_iter()
            .next()
            .ok_or_else(|| PlacementError::Store("decrement produced no event".into()))?;
        let StockEvent::StockDecremented(decremented) = &event else {
            return Err(PlacementError::Store(format!(
                "unexpected event for decrement: {event:?}"
            )));
        };

        let reservation = Reservation {
            product: product.clone(),
            unit_price: decremented.unit_price,
            previous_quantity: decremented.previous_quantity,
            new_quantity: decremented.new_quantity,
            event: event.clone(),
        };
        uow.stage_product(product)?;

        debug!(
            %product_id,
            quantity,
            previous = reservation.previous_quantity,
            remaining = reservation.new_quantity,
            "stock reserved"
        );
        Ok(reservation)
    }

    pub fn restock(
        &self,
        uow: &mut UnitOfWork<'_>,
        product_id: ProductId,
        quantity: u32,
        restocked_on: NaiveDate,
        occurred_at: DateTime<Utc>,
    ) -> Result<Adjustment, PlacementError> {
        let product = uow.lock_product(product_id)?;
        let command = StockCommand::Restock(Restock {
            product_id,
            quantity,
            restocked_on,
            occurred_at,
        });
        let (product, events) = Self::decide(product, &command)?;
        uow.stage_product(product.clone())?;

        Ok(Adjustment {
            product,
            event: events.into_iter().next(),
        })
    }

    /// Change the list price. Existing order lines keep their snapshot.
    pub fn change_price(
        &self,
        uow: &mut UnitOfWork<'_>,
        product_id: ProductId,
        price: Money,
        occurred_at: DateTime<Utc>,
    ) -> Result<Adjustment, PlacementError> {
        let product = uow.lock_product(product_id)?;
        let command = StockCommand::ChangePrice(ChangePrice {
            product_id,
            price,
            occurred_at,
        });
        let (product, events) = Self::decide(product, &command)?;
        if !events.is_empty() {
            uow.stage_product(product.clone())?;
        }

        Ok(Adjustment {
            product,
            event: events.into_iter().next(),
        })
    }

    fn decide(
        mut product: Product,
        command: &StockCommand,
    ) -> Result<(Product, Vec<StockEvent>), PlacementError> {
        let events = product.execute(command)?;
        product.ensure_non_negative()?;
        Ok((product, events))
    }
}
