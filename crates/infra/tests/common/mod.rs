#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use stockflow_core::{AddressId, CategoryId, CustomerId, Money, ProductId, SupplierId};
use stockflow_events::{EventEnvelope, InMemoryEventBus};
use stockflow_infra::{
    Address, Category, Customer, EngineConfig, InMemoryStore, OrderPlacementCoordinator,
    PlaceOrder, Supplier,
};
use stockflow_inventory::NewProduct;
use stockflow_sales::OrderPlaced;

pub type Bus = Arc<InMemoryEventBus<EventEnvelope<OrderPlaced>>>;
pub type Coordinator = OrderPlacementCoordinator<Arc<InMemoryStore>, Bus>;

/// A store seeded with one supplier, one category and one customer with an address.
pub struct Fixture {
    pub coordinator: Coordinator,
    pub store: Arc<InMemoryStore>,
    pub bus: Bus,
    pub customer_id: CustomerId,
    pub address_id: AddressId,
    supplier_id: SupplierId,
    category_id: CategoryId,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_lock_timeout(timeout: Duration) -> Self {
        Self::with_config(EngineConfig {
            lock_timeout: timeout,
            ..EngineConfig::default()
        })
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let store = Arc::new(InMemoryStore::from_config(&config));
        let bus: Bus = Arc::new(InMemoryEventBus::new());

        let supplier_id = SupplierId::new();
        let category_id = CategoryId::new();
        store
            .insert_supplier(Supplier {
                id: supplier_id,
                name: "Acme Supply".into(),
            })
            .unwrap();
        store
            .insert_category(Category {
                id: category_id,
                name: "Kitchen".into(),
            })
            .unwrap();

        let fixture = Self {
            coordinator: OrderPlacementCoordinator::new(
                store.clone(),
                store.clone(),
                bus.clone(),
                &config,
            ),
            store,
            bus,
            customer_id: CustomerId::new(),
            address_id: AddressId::new(),
            supplier_id,
            category_id,
        };
        fixture.add_customer(fixture.customer_id, fixture.address_id, "Ada");
        fixture
    }

    pub fn add_customer(&self, customer_id: CustomerId, address_id: AddressId, name: &str) {
        self.store
            .insert_customer(Customer {
                id: customer_id,
                name: name.into(),
                email: format!("{}@example.com", name.to_lowercase()),
            })
            .unwrap();
        self.store
            .insert_address(Address {
                id: address_id,
                customer_id,
                street: "1 Main St".into(),
                city: "Springfield".into(),
                postal_code: "12345".into(),
                country: "US".into(),
            })
            .unwrap();
    }

    pub fn add_product(&self, name: &str, sku: &str, price_cents: u64, stock: i64) -> ProductId {
        self.store
            .insert_product(NewProduct {
                id: ProductId::new(),
                name: name.into(),
                sku: sku.into(),
                price: Money::from_cents(price_cents),
                cost: Money::from_cents(price_cents / 2),
                supplier_id: self.supplier_id,
                category_id: self.category_id,
                stock_quantity: stock,
                last_restocked: None,
            })
            .unwrap()
    }

    pub fn request(&self, product_id: ProductId, quantity: u32) -> PlaceOrder {
        PlaceOrder::new(self.customer_id, self.address_id, product_id, quantity)
    }

    pub fn stock(&self, product_id: ProductId) -> i64 {
        self.store
            .product(product_id)
            .unwrap()
            .unwrap()
            .stock_quantity()
    }

    /// (orders, payments, alerts)
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.store.orders_count().unwrap(),
            self.store.payments_count().unwrap(),
            self.store.alerts_count().unwrap(),
        )
    }
}
