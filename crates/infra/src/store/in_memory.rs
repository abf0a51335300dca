use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tracing::debug;

use stockflow_core::{
    AddressId, CategoryId, CustomerId, OrderId, PaymentId, ProductId, SupplierId,
};
use stockflow_inventory::{NewProduct, Product, StockAlert, StockError};
use stockflow_sales::{Order, OrderLine, Payment};

use super::directory::{Address, Category, Customer, Directory, Supplier};
use super::unit_of_work::UnitOfWork;
use super::StoreError;
use crate::config::EngineConfig;
use crate::lock::RowLockTable;

/// Committed rows. Only mutated by [`UnitOfWork::commit`] and the seeding
/// operations below, always under the write half of [`InMemoryStore::tables`].
#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub(crate) suppliers: HashMap<SupplierId, Supplier>,
    pub(crate) categories: HashMap<CategoryId, Category>,
    pub(crate) customers: HashMap<CustomerId, Customer>,
    pub(crate) addresses: HashMap<AddressId, Address>,
    pub(crate) products: HashMap<ProductId, Product>,
    pub(crate) orders: HashMap<OrderId, Order>,
    pub(crate) payments: HashMap<PaymentId, Payment>,
    pub(crate) payment_by_order: HashMap<OrderId, PaymentId>,
    pub(crate) alerts: Vec<StockAlert>,
}

/// In-memory relational store with per-product row locks.
///
/// Intended for tests/dev and the demo server.
#[derive(Debug)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    rows: RowLockTable<ProductId>,
    lock_timeout: Duration,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_lock_timeout(config.lock_timeout)
    }

    pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            rows: RowLockTable::new(),
            lock_timeout,
        }
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    /// Start a unit of work. Nothing it stages is visible until commit.
    pub fn begin(&self) -> UnitOfWork<'_> {
        UnitOfWork::new(self)
    }

    pub(crate) fn rows(&self) -> &RowLockTable<ProductId> {
        &self.rows
    }

    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Poisoned("tables".into()))
    }

    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Poisoned("tables".into()))
    }

    // ---- seeding -------------------------------------------------------

    pub fn insert_supplier(&self, supplier: Supplier) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        tables.suppliers.insert(supplier.id, supplier);
        Ok(())
    }

    pub fn insert_category(&self, category: Category) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        tables.categories.insert(category.id, category);
        Ok(())
    }

    pub fn insert_customer(&self, customer: Customer) -> Result<(), StoreError> {
        if customer.email.trim().is_empty() {
            return Err(StoreError::InvalidRecord("customer email cannot be empty".into()));
        }
        let mut tables = self.write()?;
        tables.customers.insert(customer.id, customer);
        Ok(())
    }

    pub fn insert_address(&self, address: Address) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if !tables.customers.contains_key(&address.customer_id) {
            return Err(StoreError::MissingReference(format!(
                "customer {}",
                address.customer_id
            )));
        }
        tables.addresses.insert(address.id, address);
        Ok(())
    }

    /// Add a product row. Supplier and category must exist; SKU must be unique.
    pub fn insert_product(&self, new: NewProduct) -> Result<ProductId, StoreError> {
        let product = Product::new(new).map_err(|e| match e {
            StockError::NegativeStock {
                product_id,
                attempted,
            } => StoreError::NegativeStock {
                product_id,
                attempted,
            },
            other => StoreError::InvalidRecord(other.to_string()),
        })?;

        let mut tables = self.write()?;
        if !tables.suppliers.contains_key(&product.supplier_id()) {
            return Err(StoreError::MissingReference(format!(
                "supplier {}",
                product.supplier_id()
            )));
        }
        if !tables.categories.contains_key(&product.category_id()) {
            return Err(StoreError::MissingReference(format!(
                "category {}",
                product.category_id()
            )));
        }
        if tables.products.values().any(|p| p.sku() == product.sku()) {
            return Err(StoreError::DuplicateSku(product.sku().to_string()));
        }

        let id = product.id_typed();
        debug!(product_id = %id, sku = product.sku(), "product inserted");
        tables.products.insert(id, product);
        Ok(id)
    }

    // ---- reads ---------------------------------------------------------

    pub fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    pub fn order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.read()?.orders.get(&id).cloned())
    }

    pub fn order_lines(&self, id: OrderId) -> Result<Vec<OrderLine>, StoreError> {
        Ok(self
            .read()?
            .orders
            .get(&id)
            .map(|o| o.lines().to_vec())
            .unwrap_or_default())
    }

    pub fn payments_for_order(&self, id: OrderId) -> Result<Vec<Payment>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .payment_by_order
            .get(&id)
            .and_then(|pid| tables.payments.get(pid))
            .cloned()
            .into_iter()
            .collect())
    }

    /// Alerts for a product, oldest first.
    pub fn alerts_for_product(&self, id: ProductId) -> Result<Vec<StockAlert>, StoreError> {
        Ok(self
            .read()?
            .alerts
            .iter()
            .filter(|a| a.product_id == id)
            .cloned()
            .collect())
    }

    pub fn orders_count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.orders.len())
    }

    pub fn payments_count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.payments.len())
    }

    pub fn alerts_count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.alerts.len())
    }
}

impl Directory for InMemoryStore {
    fn address_belongs_to_customer(
        &self,
        address_id: AddressId,
        customer_id: CustomerId,
    ) -> Result<bool, StoreError> {
        let tables = self.read()?;
        if !tables.customers.contains_key(&customer_id) {
            return Ok(false);
        }
        Ok(tables
            .addresses
            .get(&address_id)
            .is_some_and(|a| a.customer_id == customer_id))
    }
}
