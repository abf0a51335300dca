use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::Deserialize;

use stockflow_core::{AddressId, CustomerId, Money, ProductId};
use stockflow_infra::{PlaceOrder, PlacedOrder};
use stockflow_inventory::{Product, StockAlert};
use stockflow_sales::{Order, Payment, PaymentMethod};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub customer_id: String,
    pub shipping_address_id: String,
    pub product_id: String,
    pub quantity: u32,
    pub payment_method: Option<String>,
    /// Decimal amount, e.g. `"599.97"`. Defaults to the order total.
    pub amount: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub quantity: u32,
    /// `YYYY-MM-DD`; defaults to today.
    pub restocked_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePriceRequest {
    pub price: String,
}

impl PlaceOrderRequest {
    pub fn into_command(self) -> Result<PlaceOrder, axum::response::Response> {
        let customer_id: CustomerId = self
            .customer_id
            .parse()
            .map_err(|_| errors::invalid_id("customer"))?;
        let shipping_address_id: AddressId = self
            .shipping_address_id
            .parse()
            .map_err(|_| errors::invalid_id("address"))?;
        let product_id: ProductId = self
            .product_id
            .parse()
            .map_err(|_| errors::invalid_id("product"))?;

        let method = match self.payment_method.as_deref() {
            Some(m) => m.parse::<PaymentMethod>().map_err(|e| {
                errors::json_error(StatusCode::BAD_REQUEST, "validation", e.to_string())
            })?,
            None => PaymentMethod::default(),
        };
        let amount = self.amount.as_deref().map(parse_money).transpose()?;

        Ok(
            PlaceOrder::new(customer_id, shipping_address_id, product_id, self.quantity)
                .with_payment(method, amount),
        )
    }
}

pub fn parse_money(raw: &str) -> Result<Money, axum::response::Response> {
    raw.parse::<Money>()
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "validation", e.to_string()))
}

// -------------------------
// Response mapping
// -------------------------

pub fn placed_to_json(placed: &PlacedOrder) -> serde_json::Value {
    serde_json::json!({
        "order_id": placed.order_id.to_string(),
        "payment_id": placed.payment_id.to_string(),
        "total": placed.total.to_string(),
        "remaining_stock": placed.remaining_stock,
    })
}

pub fn order_to_json(order: &Order, payments: &[Payment]) -> serde_json::Value {
    let total = order.total().map(|t| t.to_string()).ok();
    serde_json::json!({
        "id": order.id_typed().to_string(),
        "created_at": order.created_at().to_rfc3339(),
        "customer_id": order.customer_id().to_string(),
        "shipping_address_id": order.shipping_address_id().to_string(),
        "status": order.status(),
        "total": total,
        "lines": order.lines().iter().map(|l| serde_json::json!({
            "id": l.id.to_string(),
            "product_id": l.product_id.to_string(),
            "quantity": l.quantity,
            "unit_price": l.unit_price.to_string(),
        })).collect::<Vec<_>>(),
        "payments": payments.iter().map(|p| serde_json::json!({
            "id": p.id.to_string(),
            "method": p.method,
            "amount": p.amount.to_string(),
            "status": p.status,
            "paid_at": p.paid_at.to_rfc3339(),
        })).collect::<Vec<_>>(),
    })
}

pub fn product_to_json(product: &Product) -> serde_json::Value {
    use stockflow_core::AggregateRoot;

    serde_json::json!({
        "id": product.id_typed().to_string(),
        "name": product.name(),
        "sku": product.sku(),
        "price": product.price().to_string(),
        "cost": product.cost().to_string(),
        "supplier_id": product.supplier_id().to_string(),
        "category_id": product.category_id().to_string(),
        "stock_quantity": product.stock_quantity(),
        "last_restocked": product.last_restocked().map(|d| d.to_string()),
        "version": product.version(),
    })
}

pub fn alert_to_json(alert: &StockAlert) -> serde_json::Value {
    serde_json::json!({
        "id": alert.id.to_string(),
        "product_id": alert.product_id.to_string(),
        "created_at": alert.created_at.to_rfc3339(),
        "message": alert.message,
    })
}
