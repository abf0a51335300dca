use std::collections::{HashMap, HashSet};

use tracing::debug;

use stockflow_core::{AggregateRoot, ExpectedVersion, OrderId, ProductId};
use stockflow_inventory::{Product, StockAlert, StockError};
use stockflow_sales::{Order, Payment};

use super::in_memory::InMemoryStore;
use super::StoreError;
use crate::lock::{LockError, RowLockGuard};

/// Counts of rows written by a successful commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub products: usize,
    pub orders: usize,
    pub payments: usize,
    pub alerts: usize,
}

/// Staged writes against an [`InMemoryStore`].
///
/// Product rows must be locked through [`UnitOfWork::lock_product`] before they
/// can be staged; the row locks are held until the unit is committed or
/// dropped. Dropping without [`UnitOfWork::commit`] discards everything.
#[derive(Debug)]
pub struct UnitOfWork<'a> {
    store: &'a InMemoryStore,
    locks: HashMap<ProductId, RowLockGuard>,
    read_versions: HashMap<ProductId, u64>,
    products: HashMap<ProductId, Product>,
    orders: Vec<Order>,
    payments: Vec<Payment>,
    alerts: Vec<StockAlert>,
    finished: bool,
}

fn negative_stock(err: StockError) -> StoreError {
    match err {
        StockError::NegativeStock {
            product_id,
            attempted,
        } => StoreError::NegativeStock {
            product_id,
            attempted,
        },
        other => StoreError::InvalidRecord(other.to_string()),
    }
}

impl<'a> UnitOfWork<'a> {
    pub(crate) fn new(store: &'a InMemoryStore) -> Self {
        Self {
            store,
            locks: HashMap::new(),
            read_versions: HashMap::new(),
            products: HashMap::new(),
            orders: Vec::new(),
            payments: Vec::new(),
            alerts: Vec::new(),
            finished: false,
        }
    }

    /// Take the row lock for `id` (bounded wait) and return the row as this
    /// unit sees it: the staged copy if there is one, else the committed row.
    pub fn lock_product(&mut self, id: ProductId) -> Result<Product, StoreError> {
        if self.locks.contains_key(&id) {
            if let Some(staged) = self.products.get(&id) {
                return Ok(staged.clone());
            }
            return self.store.product(id)?.ok_or(StoreError::ProductNotFound(id));
        }

        // Unknown ids fail fast instead of queueing on a lock.
        if self.store.product(id)?.is_none() {
            return Err(StoreError::ProductNotFound(id));
        }

        let guard = self
            .store
            .rows()
            .acquire(&id, self.store.lock_timeout())
            .map_err(|e| match e {
                LockError::Timeout(waited) => StoreError::Busy {
                    product_id: id,
                    waited,
                },
                LockError::Poisoned(msg) => StoreError::Poisoned(msg),
            })?;

        let product = self
            .store
            .product(id)?
            .ok_or(StoreError::ProductNotFound(id))?;

        self.read_versions.insert(id, product.version());
        self.locks.insert(id, guard);
        Ok(product)
    }

    /// Stage a new version of a locked product row.
    pub fn stage_product(&mut self, product: Product) -> Result<(), StoreError> {
        let id = product.id_typed();
        if !self.locks.contains_key(&id) {
            return Err(StoreError::NotLocked(id));
        }
        product.ensure_non_negative().map_err(negative_stock)?;
        self.products.insert(id, product);
        Ok(())
    }

    pub fn stage_order(&mut self, order: Order) {
        self.orders.push(order);
    }

    pub fn stage_payment(&mut self, payment: Payment) {
        self.payments.push(payment);
    }

    pub fn stage_alert(&mut self, alert: StockAlert) {
        self.alerts.push(alert);
    }

    pub fn staged_product(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    pub fn staged_order(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id_typed() == id)
    }

    pub fn staged_payment(&self, order_id: OrderId) -> Option<&Payment> {
        self.payments.iter().find(|p| p.order_id == order_id)
    }

    pub fn staged_alerts(&self) -> &[StockAlert] {
        &self.alerts
    }

    fn is_empty(&self) -> bool {
        self.products.is_empty()
            && self.orders.is_empty()
            && self.payments.is_empty()
            && self.alerts.is_empty()
    }

    /// Validate and apply every staged write under one table write lock.
    ///
    /// Either all rows become visible or none do.
    pub fn commit(mut self) -> Result<CommitSummary, StoreError> {
        let store = self.store;
        let mut tables = store.write()?;

        for (id, product) in &self.products {
            let current = tables
                .products
                .get(id)
                .ok_or(StoreError::ProductNotFound(*id))?;
            let expected = self
                .read_versions
                .get(id)
                .copied()
                .map(ExpectedVersion::Exact)
                .unwrap_or(ExpectedVersion::Any);
            expected
                .check(current.version())
                .map_err(|e| StoreError::Conflict(format!("product {id}: {e}")))?;
            product.ensure_non_negative().map_err(negative_stock)?;
        }

        let mut paid: HashSet<OrderId> = HashSet::new();
        for payment in &self.payments {
            let known = self.orders.iter().any(|o| o.id_typed() == payment.order_id)
                || tables.orders.contains_key(&payment.order_id);
            if !known {
                return Err(StoreError::OrderNotStaged(payment.order_id));
            }
            if tables.payment_by_order.contains_key(&payment.order_id)
                || !paid.insert(payment.order_id)
            {
                return Err(StoreError::DuplicatePayment(payment.order_id));
            }
        }

        for order in &self.orders {
            if !paid.contains(&order.id_typed()) {
                return Err(StoreError::MissingPayment(order.id_typed()));
            }
            for line in order.lines() {
                if !tables.products.contains_key(&line.product_id) {
                    return Err(StoreError::MissingReference(format!(
                        "product {} on order {}",
                        line.product_id,
                        order.id_typed()
                    )));
                }
            }
        }

        let summary = CommitSummary {
            products: self.products.len(),
            orders: self.orders.len(),
            payments: self.payments.len(),
            alerts: self.alerts.len(),
        };

        for (id, product) in self.products.drain() {
            tables.products.insert(id, product);
        }
        for order in self.orders.drain(..) {
            tables.orders.insert(order.id_typed(), order);
        }
        for payment in self.payments.drain(..) {
            tables.payment_by_order.insert(payment.order_id, payment.id);
            tables.payments.insert(payment.id, payment);
        }
        tables.alerts.append(&mut self.alerts);
        drop(tables);

        self.finished = true;
        debug!(?summary, "unit of work committed");
        Ok(summary)
    }

    /// Discard every staged write and release the row locks.
    pub fn rollback(mut self) {
        self.finished = true;
        debug!("unit of work rolled back");
    }
}

impl Drop for UnitOfWork<'_> {
    fn drop(&mut self) {
        if !self.finished && !self.is_empty() {
            debug!("unit of work dropped without commit; staged writes discarded");
        }
    }
}
