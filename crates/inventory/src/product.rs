use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockflow_core::{Aggregate, AggregateRoot, CategoryId, Money, ProductId, SupplierId};
use stockflow_events::Event;

/// Errors raised by stock decisions on a single product row.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    #[error("quantity must be positive")]
    InvalidQuantity,

    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: i64 },

    /// A write would leave the row below zero. The insufficient-stock check
    /// should make this unreachable; seeing it means a logic bug.
    #[error("stock for product {product_id} would become negative ({attempted})")]
    NegativeStock { product_id: ProductId, attempted: i64 },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

/// Aggregate root: Product (the stock row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    sku: String,
    price: Money,
    cost: Money,
    supplier_id: SupplierId,
    category_id: CategoryId,
    stock_quantity: i64,
    last_restocked: Option<NaiveDate>,
    version: u64,
}

/// Catalog fields for a new product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    pub price: Money,
    pub cost: Money,
    pub supplier_id: SupplierId,
    pub category_id: CategoryId,
    pub stock_quantity: i64,
    pub last_restocked: Option<NaiveDate>,
}

impl Product {
    pub fn new(new: NewProduct) -> Result<Self, StockError> {
        if new.name.trim().is_empty() {
            return Err(StockError::Validation("name cannot be empty".into()));
        }
        if new.sku.trim().is_empty() {
            return Err(StockError::Validation("sku cannot be empty".into()));
        }
        if new.price.is_zero() {
            return Err(StockError::Validation("price must be positive".into()));
        }
        if new.stock_quantity < 0 {
            return Err(StockError::NegativeStock {
                product_id: new.id,
                attempted: new.stock_quantity,
            });
        }

        Ok(Self {
            id: new.id,
            name: new.name,
            sku: new.sku,
            price: new.price,
            cost: new.cost,
            supplier_id: new.supplier_id,
            category_id: new.category_id,
            stock_quantity: new.stock_quantity,
            last_restocked: new.last_restocked,
            version: 0,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn cost(&self) -> Money {
        self.cost
    }

    pub fn supplier_id(&self) -> SupplierId {
        self.supplier_id
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn stock_quantity(&self) -> i64 {
        self.stock_quantity
    }

    pub fn last_restocked(&self) -> Option<NaiveDate> {
        self.last_restocked
    }

    /// The non-negative check applied at every write of this row.
    pub fn ensure_non_negative(&self) -> Result<(), StockError> {
        if self.stock_quantity < 0 {
            return Err(StockError::NegativeStock {
                product_id: self.id,
                attempted: self.stock_quantity,
            });
        }
        Ok(())
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: DecrementStock (a sale).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecrementStock {
    pub product_id: ProductId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Restock (goods received).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restock {
    pub product_id: ProductId,
    pub quantity: u32,
    pub restocked_on: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangePrice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePrice {
    pub product_id: ProductId,
    pub price: Money,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockCommand {
    Decrement(DecrementStock),
    Restock(Restock),
    ChangePrice(ChangePrice),
}

/// Event: StockDecremented. Carries the unit price at reservation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDecremented {
    pub product_id: ProductId,
    pub quantity: u32,
    pub previous_quantity: i64,
    pub new_quantity: i64,
    pub unit_price: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: Restocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restocked {
    pub product_id: ProductId,
    pub quantity: u32,
    pub previous_quantity: i64,
    pub new_quantity: i64,
    pub restocked_on: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PriceChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceChanged {
    pub product_id: ProductId,
    pub previous_price: Money,
    pub price: Money,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockEvent {
    StockDecremented(StockDecremented),
    Restocked(Restocked),
    PriceChanged(PriceChanged),
}

impl StockEvent {
    pub fn product_id(&self) -> ProductId {
        match self {
            StockEvent::StockDecremented(e) => e.product_id,
            StockEvent::Restocked(e) => e.product_id,
            StockEvent::PriceChanged(e) => e.product_id,
        }
    }

    /// Quantity on hand after the event, for events that move stock.
    pub fn new_quantity(&self) -> Option<i64> {
        match self {
            StockEvent::StockDecremented(e) => Some(e.new_quantity),
            StockEvent::Restocked(e) => Some(e.new_quantity),
            StockEvent::PriceChanged(_) => None,
        }
    }
}

impl Event for StockEvent {
    fn event_type(&self) -> &'static str {
        match self {
            StockEvent::StockDecremented(_) => "inventory.stock.decremented",
            StockEvent::Restocked(_) => "inventory.stock.restocked",
            StockEvent::PriceChanged(_) => "inventory.product.price_changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            StockEvent::StockDecremented(e) => e.occurred_at,
            StockEvent::Restocked(e) => e.occurred_at,
            StockEvent::PriceChanged(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Product {
    type Command = StockCommand;
    type Event = StockEvent;
    type Error = StockError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            StockEvent::StockDecremented(e) => {
                self.stock_quantity = e.new_quantity;
            }
            StockEvent::Restocked(e) => {
                self.stock_quantity = e.new_quantity;
                self.last_restocked = Some(e.restocked_on);
            }
            StockEvent::PriceChanged(e) => {
                self.price = e.price;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            StockCommand::Decrement(cmd) => self.handle_decrement(cmd),
            StockCommand::Restock(cmd) => self.handle_restock(cmd),
            StockCommand::ChangePrice(cmd) => self.handle_change_price(cmd),
        }
    }
}

impl Product {
    fn ensure_product_id(&self, product_id: ProductId) -> Result<(), StockError> {
        if self.id != product_id {
            return Err(StockError::InvariantViolation("product_id mismatch".into()));
        }
        Ok(())
    }

    fn handle_decrement(&self, cmd: &DecrementStock) -> Result<Vec<StockEvent>, StockError> {
        self.ensure_product_id(cmd.product_id)?;

        if cmd.quantity == 0 {
            return Err(StockError::InvalidQuantity);
        }

        let requested = i64::from(cmd.quantity);
        if self.stock_quantity < requested {
            return Err(StockError::InsufficientStock {
                requested: cmd.quantity,
                available: self.stock_quantity,
            });
        }

        Ok(vec![StockEvent::StockDecremented(StockDecremented {
            product_id: cmd.product_id,
            quantity: cmd.quantity,
            previous_quantity: self.stock_quantity,
            new_quantity: self.stock_quantity - requested,
            unit_price: self.price,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_restock(&self, cmd: &Restock) -> Result<Vec<StockEvent>, StockError> {
        self.ensure_product_id(cmd.product_id)?;

        if cmd.quantity == 0 {
            return Err(StockError::InvalidQuantity);
        }

        let new_quantity = self
            .stock_quantity
            .checked_add(i64::from(cmd.quantity))
            .ok_or_else(|| StockError::Validation("stock quantity overflow".into()))?;

        Ok(vec![StockEvent::Restocked(Restocked {
            product_id: cmd.product_id,
            quantity: cmd.quantity,
            previous_quantity: self.stock_quantity,
            new_quantity,
            restocked_on: cmd.restocked_on,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_change_price(&self, cmd: &ChangePrice) -> Result<Vec<StockEvent>, StockError> {
        self.ensure_product_id(cmd.product_id)?;

        if cmd.price.is_zero() {
            return Err(StockError::Validation("price must be positive".into()));
        }
        if cmd.price == self.price {
            return Ok(vec![]);
        }

        Ok(vec![StockEvent::PriceChanged(PriceChanged {
            product_id: cmd.product_id,
            previous_price: self.price,
            price: cmd.price,
            occurred_at: cmd.occurred_at,
        })])
    }
}
