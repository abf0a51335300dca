use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use stockflow_core::{AddressId, CategoryId, CustomerId, Money, ProductId, SupplierId};
use stockflow_events::{EventBus, EventEnvelope, InMemoryEventBus};
use stockflow_infra::{
    Address, Category, Customer, EngineConfig, InMemoryStore, OrderPlacementCoordinator,
    StoreError, Supplier,
};
use stockflow_inventory::NewProduct;
use stockflow_sales::OrderPlaced;

pub type OrderBus = Arc<InMemoryEventBus<EventEnvelope<OrderPlaced>>>;
pub type Coordinator = OrderPlacementCoordinator<Arc<InMemoryStore>, OrderBus>;

/// Shared application services handed to every handler.
pub struct AppServices {
    pub store: Arc<InMemoryStore>,
    pub coordinator: Coordinator,
    pub bus: OrderBus,
}

/// Ids of the demo catalog, for trying the API by hand.
#[derive(Debug, Clone)]
pub struct DemoData {
    pub customer_id: CustomerId,
    pub address_id: AddressId,
    /// (sku, id)
    pub products: Vec<(String, ProductId)>,
}

pub fn build_services(config: &EngineConfig) -> AppServices {
    let store = Arc::new(InMemoryStore::from_config(config));
    let bus: OrderBus = Arc::new(InMemoryEventBus::new());
    spawn_order_feed(&bus);

    AppServices {
        coordinator: OrderPlacementCoordinator::new(store.clone(), store.clone(), bus.clone(), config),
        store,
        bus,
    }
}

/// Log every committed order. Ends when the bus is dropped.
fn spawn_order_feed(bus: &OrderBus) {
    let sub = bus.subscribe();
    std::thread::spawn(move || {
        for env in sub.iter() {
            let placed = env.payload();
            tracing::info!(
                event_id = %env.event_id(),
                order_id = %placed.order_id,
                customer_id = %placed.customer_id,
                total = %placed.total,
                "order feed"
            );
        }
    });
}

impl AppServices {
    /// Seed one supplier, category, customer (with address) and three products.
    ///
    /// Ids are fixed so the same requests work across restarts.
    pub fn seed_demo(&self) -> Result<DemoData, StoreError> {
        let supplier_id = SupplierId::from_uuid(Uuid::from_u128(0x5e_0001));
        let category_id = CategoryId::from_uuid(Uuid::from_u128(0xca_0001));
        let customer_id = CustomerId::from_uuid(Uuid::from_u128(0xc0_0001));
        let address_id = AddressId::from_uuid(Uuid::from_u128(0xad_0001));

        self.store.insert_supplier(Supplier {
            id: supplier_id,
            name: "Northwind Traders".into(),
        })?;
        self.store.insert_category(Category {
            id: category_id,
            name: "Kitchen".into(),
        })?;
        self.store.insert_customer(Customer {
            id: customer_id,
            name: "Demo Customer".into(),
            email: "demo@example.com".into(),
        })?;
        self.store.insert_address(Address {
            id: address_id,
            customer_id,
            street: "1 Demo Way".into(),
            city: "Springfield".into(),
            postal_code: "12345".into(),
            country: "US".into(),
        })?;

        let catalog = [
            (0x9d_0001u128, "Espresso Machine", "ESP-100", 19_999u64, 12_000u64, 50i64),
            (0x9d_0002, "Widget", "W-1", 250, 100, 12),
            (0x9d_0003, "Burr Grinder", "GRD-1", 4_500, 2_000, 5),
        ];
        let restocked = NaiveDate::from_ymd_opt(2024, 1, 15);

        let mut products = Vec::with_capacity(catalog.len());
        for (id, name, sku, price, cost, stock) in catalog {
            let id = self.store.insert_product(NewProduct {
                id: ProductId::from_uuid(Uuid::from_u128(id)),
                name: name.into(),
                sku: sku.into(),
                price: Money::from_cents(price),
                cost: Money::from_cents(cost),
                supplier_id,
                category_id,
                stock_quantity: stock,
                last_restocked: restocked,
            })?;
            products.push((sku.to_string(), id));
        }

        Ok(DemoData {
            customer_id,
            address_id,
            products,
        })
    }
}
