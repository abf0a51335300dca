//! Seed helpers shared by the unit tests in this crate.

use std::sync::Arc;
use std::time::Duration;

use stockflow_core::{AddressId, CategoryId, CustomerId, Money, ProductId, SupplierId};
use stockflow_inventory::NewProduct;

use crate::store::{Address, Category, Customer, InMemoryStore, Supplier};

pub(crate) struct Seeded {
    pub store: Arc<InMemoryStore>,
    pub product_id: ProductId,
    pub customer_id: CustomerId,
    pub address_id: AddressId,
}

/// One supplier, category, customer with an address, and a product priced
/// `price_cents` with `stock` units. Lock waits are kept short.
pub(crate) fn seeded(stock: i64, price_cents: u64) -> Seeded {
    let store = Arc::new(InMemoryStore::with_lock_timeout(Duration::from_millis(50)));

    let supplier_id = SupplierId::new();
    let category_id = CategoryId::new();
    store
        .insert_supplier(Supplier {
            id: supplier_id,
            name: "Acme".into(),
        })
        .unwrap();
    store
        .insert_category(Category {
            id: category_id,
            name: "Kitchen".into(),
        })
        .unwrap();

    let customer_id = CustomerId::new();
    let address_id = AddressId::new();
    store
        .insert_customer(Customer {
            id: customer_id,
            name: "Dana".into(),
            email: "dana@example.com".into(),
        })
        .unwrap();
    store
        .insert_address(Address {
            id: address_id,
            customer_id,
            street: "1 Main St".into(),
            city: "Springfield".into(),
            postal_code: "12345".into(),
            country: "US".into(),
        })
        .unwrap();

    let product_id = store
        .insert_product(NewProduct {
            id: ProductId::new(),
            name: "Espresso Machine".into(),
            sku: "ESP-100".into(),
            price: Money::from_cents(price_cents),
            cost: Money::from_cents(price_cents / 2),
            supplier_id,
            category_id,
            stock_quantity: stock,
            last_restocked: None,
        })
        .unwrap();

    Seeded {
        store,
        product_id,
        customer_id,
        address_id,
    }
}
