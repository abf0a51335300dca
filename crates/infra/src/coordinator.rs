//! Order Placement Coordinator.
//!
//! One call, one unit of work:
//!
//! ```text
//! Received → StockReserved → OrderCreated → PaymentRecorded → Committed
//!     ↘            ↘               ↘                ↘
//!                           Aborted
//! ```
//!
//! Every effect (stock write, alert, order, line, payment) is staged in a
//! [`UnitOfWork`] and only becomes visible on commit. Any failure drops the
//! unit, which discards the staged writes and releases the product row lock.
//! `OrderPlaced` is published strictly after commit.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, info_span, warn};

use stockflow_core::{AddressId, CustomerId, Money, OrderId, PaymentId, ProductId};
use stockflow_events::{EventBus, EventEnvelope};
use stockflow_inventory::Product;
use stockflow_sales::{NewOrder, OrderPlaced, PaymentMethod};

use crate::alerts::AlertEmitter;
use crate::assembler::OrderAssembler;
use crate::config::EngineConfig;
use crate::error::PlacementError;
use crate::ledger::{Adjustment, StockLedger};
use crate::payments::PaymentRecorder;
use crate::store::{Directory, InMemoryStore, StoreError, UnitOfWork};

/// Aggregate type recorded on published order envelopes.
pub const ORDER_AGGREGATE_TYPE: &str = "sales.order";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementState {
    Received,
    StockReserved,
    OrderCreated,
    PaymentRecorded,
    Committed,
    Aborted,
}

impl PlacementState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PlacementState::Committed | PlacementState::Aborted)
    }

    pub fn can_transition_to(self, next: PlacementState) -> bool {
        use PlacementState::*;
        match (self, next) {
            (Received, StockReserved)
            | (StockReserved, OrderCreated)
            | (OrderCreated, PaymentRecorded)
            | (PaymentRecorded, Committed) => true,
            (from, Aborted) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// Tracks one placement's progress; lives for a single call.
#[derive(Debug)]
struct Placement {
    state: PlacementState,
}

impl Placement {
    fn new() -> Self {
        Self {
            state: PlacementState::Received,
        }
    }

    fn advance(&mut self, next: PlacementState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal placement transition {:?} -> {next:?}",
            self.state
        );
        debug!(from = ?self.state, to = ?next, "placement transition");
        self.state = next;
    }
}

/// Request to buy `quantity` units of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub customer_id: CustomerId,
    pub shipping_address_id: AddressId,
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Amount the caller pays; `None` pays the order total.
    #[serde(default)]
    pub tendered_amount: Option<Money>,
}

impl PlaceOrder {
    pub fn new(
        customer_id: CustomerId,
        shipping_address_id: AddressId,
        product_id: ProductId,
        quantity: u32,
    ) -> Self {
        Self {
            customer_id,
            shipping_address_id,
            product_id,
            quantity,
            payment_method: PaymentMethod::default(),
            tendered_amount: None,
        }
    }

    pub fn with_payment(mut self, method: PaymentMethod, amount: Option<Money>) -> Self {
        self.payment_method = method;
        self.tendered_amount = amount;
        self
    }
}

/// Outcome of a committed placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub payment_id: PaymentId,
    pub total: Money,
    pub remaining_stock: i64,
}

/// The only public entry point for placing orders.
///
/// - `D`: customer/address lookups for the assembler
/// - `B`: bus receiving `OrderPlaced` after commit
pub struct OrderPlacementCoordinator<D, B> {
    store: Arc<InMemoryStore>,
    ledger: StockLedger,
    alerts: AlertEmitter,
    assembler: OrderAssembler<D>,
    payments: PaymentRecorder,
    bus: B,
}

impl<D, B> OrderPlacementCoordinator<D, B>
where
    D: Directory,
    B: EventBus<EventEnvelope<OrderPlaced>>,
{
    pub fn new(store: Arc<InMemoryStore>, directory: D, bus: B, config: &EngineConfig) -> Self {
        Self {
            store,
            ledger: StockLedger::new(),
            alerts: AlertEmitter::new(config.low_stock_threshold),
            assembler: OrderAssembler::new(directory),
            payments: PaymentRecorder::new(),
            bus,
        }
    }

    pub fn store(&self) -> &Arc<InMemoryStore> {
        &self.store
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Place one order atomically.
    ///
    /// Blocks while another placement holds the product's row lock, for at
    /// most the store's lock timeout.
    pub fn place_order(&self, request: PlaceOrder) -> Result<PlacedOrder, PlacementError> {
        let span = info_span!(
            "place_order",
            product_id = %request.product_id,
            quantity = request.quantity
        );
        let _enter = span.enter();

        let mut placement = Placement::new();
        match self.run(&mut placement, &request) {
            Ok((placed, event)) => {
                info!(
                    order_id = %placed.order_id,
                    payment_id = %placed.payment_id,
                    total = %placed.total,
                    remaining_stock = placed.remaining_stock,
                    "order placed"
                );
                self.publish(event);
                Ok(placed)
            }
            Err(err) => {
                let from = placement.state;
                placement.advance(PlacementState::Aborted);
                if err.is_internal() {
                    error!(?from, kind = err.kind(), error = %err, "placement aborted");
                } else {
                    warn!(?from, kind = err.kind(), error = %err, "placement aborted");
                }
                Err(err)
            }
        }
    }

    fn run(
        &self,
        placement: &mut Placement,
        request: &PlaceOrder,
    ) -> Result<(PlacedOrder, OrderPlaced), PlacementError> {
        let now = Utc::now();
        let mut uow = self.store.begin();

        let reservation =
            self.ledger
                .reserve_and_decrement(&mut uow, request.product_id, request.quantity, now)?;
        placement.advance(PlacementState::StockReserved);

        self.alerts
            .on_stock_changed(&mut uow, &reservation.product, &reservation.event);

        let order_id = self.assembler.create_order(
            &mut uow,
            NewOrder {
                customer_id: request.customer_id,
                shipping_address_id: request.shipping_address_id,
                product_id: request.product_id,
                quantity: request.quantity,
                unit_price: reservation.unit_price,
                created_at: now,
            },
        )?;
        placement.advance(PlacementState::OrderCreated);

        let payment_id = self.payments.record_payment(
            &mut uow,
            order_id,
            request.payment_method,
            request.tendered_amount,
            now,
        )?;
        placement.advance(PlacementState::PaymentRecorded);

        let event = Self::order_placed(&uow, order_id)?;
        let summary = uow.commit()?;
        placement.advance(PlacementState::Committed);
        if summary.alerts > 0 {
            info!(
                product_id = %request.product_id,
                remaining_stock = reservation.new_quantity,
                "low-stock alert recorded"
            );
        }

        Ok((
            PlacedOrder {
                order_id,
                payment_id,
                total: event.total,
                remaining_stock: reservation.new_quantity,
            },
            event,
        ))
    }

    fn order_placed(uow: &UnitOfWork<'_>, order_id: OrderId) -> Result<OrderPlaced, PlacementError> {
        let order = uow
            .staged_order(order_id)
            .ok_or(StoreError::OrderNotStaged(order_id))?;
        let payment = uow
            .staged_payment(order_id)
            .ok_or(StoreError::MissingPayment(order_id))?;
        Ok(OrderPlaced::from_committed(order, payment)?)
    }

    fn publish(&self, event: OrderPlaced) {
        let order_id = event.order_id;
        let envelope = EventEnvelope::wrap(order_id, ORDER_AGGREGATE_TYPE, event);
        // The order is committed either way; a lost notification is only logged.
        if let Err(err) = self.bus.publish(envelope) {
            warn!(%order_id, error = ?err, "failed to publish OrderPlaced");
        }
    }

    /// Receive goods. Goes through the same row lock as placements.
    pub fn restock(
        &self,
        product_id: ProductId,
        quantity: u32,
        restocked_on: NaiveDate,
    ) -> Result<Product, PlacementError> {
        let mut uow = self.store.begin();
        let adjustment =
            self.ledger
                .restock(&mut uow, product_id, quantity, restocked_on, Utc::now())?;
        self.commit_adjustment(uow, adjustment)
    }

    pub fn change_price(&self, product_id: ProductId, price: Money) -> Result<Product, PlacementError> {
        let mut uow = self.store.begin();
        let adjustment = self
            .ledger
            .change_price(&mut uow, product_id, price, Utc::now())?;
        self.commit_adjustment(uow, adjustment)
    }

    fn commit_adjustment(
        &self,
        mut uow: UnitOfWork<'_>,
        adjustment: Adjustment,
    ) -> Result<Product, PlacementError> {
        if let Some(event) = &adjustment.event {
            self.alerts
                .on_stock_changed(&mut uow, &adjustment.product, event);
        }
        uow.commit()?;
        info!(
            product_id = %adjustment.product.id_typed(),
            stock = adjustment.product.stock_quantity(),
            price = %adjustment.product.price(),
            "product adjusted"
        );
        Ok(adjustment.product)
    }
}
