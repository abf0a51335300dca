//! Inventory domain module: product stock rows and low-stock alerts.
//!
//! This crate contains the stock ledger's business rules, implemented purely as
//! deterministic domain logic (no IO, no locking, no storage). The infra crate
//! drives these decisions under a per-product lock inside a unit of work.

pub mod alert;
pub mod product;

pub use alert::{LOW_STOCK_THRESHOLD, LowStockPolicy, StockAlert};
pub use product::{
    ChangePrice, DecrementStock, NewProduct, PriceChanged, Product, Restock, Restocked,
    StockCommand, StockDecremented, StockError, StockEvent,
};
