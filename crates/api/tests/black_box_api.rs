use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;

use stockflow_api::app::services::{self, AppServices, DemoData};
use stockflow_infra::EngineConfig;

struct TestServer {
    base_url: String,
    services: Arc<AppServices>,
    demo: DemoData,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, seeded with the demo catalog, on an ephemeral port.
        let services = Arc::new(services::build_services(&EngineConfig::default()));
        let demo = services.seed_demo().expect("failed to seed demo data");
        let app = stockflow_api::app::build_app(services.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            services,
            demo,
            handle,
        }
    }

    fn product(&self, sku: &str) -> String {
        self.demo
            .products
            .iter()
            .find(|(s, _)| s == sku)
            .map(|(_, id)| id.to_string())
            .expect("unknown demo sku")
    }

    fn order_body(&self, sku: &str, quantity: u32) -> serde_json::Value {
        json!({
            "customer_id": self.demo.customer_id.to_string(),
            "shipping_address_id": self.demo.address_id.to_string(),
            "product_id": self.product(sku),
            "quantity": quantity,
        })
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn post_order(
    client: &reqwest::Client,
    srv: &TestServer,
    body: &serde_json::Value,
) -> reqwest::Response {
    client
        .post(format!("{}/orders", srv.base_url))
        .json(body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn placing_an_order_commits_order_payment_and_stock() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = post_order(&client, &srv, &srv.order_body("ESP-100", 3)).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let placed: serde_json::Value = res.json().await.unwrap();
    assert_eq!(placed["total"], "599.97");
    assert_eq!(placed["remaining_stock"], 47);

    let order_id = placed["order_id"].as_str().unwrap();
    let order: serde_json::Value = client
        .get(format!("{}/orders/{}", srv.base_url, order_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(order["status"], "pending");
    assert_eq!(order["lines"].as_array().unwrap().len(), 1);
    assert_eq!(order["lines"][0]["quantity"], 3);
    assert_eq!(order["lines"][0]["unit_price"], "199.99");
    assert_eq!(order["payments"].as_array().unwrap().len(), 1);
    assert_eq!(order["payments"][0]["amount"], "599.97");
    assert_eq!(order["payments"][0]["status"], "pending");
    assert_eq!(order["payments"][0]["method"], "credit_card");

    let product: serde_json::Value = client
        .get(format!("{}/products/{}", srv.base_url, srv.product("ESP-100")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(product["stock_quantity"], 47);
}

#[tokio::test]
async fn insufficient_stock_is_a_conflict_and_changes_nothing() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = post_order(&client, &srv, &srv.order_body("GRD-1", 10)).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "insufficient_stock");

    assert_eq!(srv.services.store.orders_count().unwrap(), 0);
    let product: serde_json::Value = client
        .get(format!("{}/products/{}", srv.base_url, srv.product("GRD-1")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(product["stock_quantity"], 5);
}

#[tokio::test]
async fn low_stock_alerts_are_listed_per_product() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = post_order(&client, &srv, &srv.order_body("W-1", 4)).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let alerts: serde_json::Value = client
        .get(format!("{}/products/{}/alerts", srv.base_url, srv.product("W-1")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let items = alerts["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0]["message"],
        "Low stock: Widget (SKU W-1) has 8 units remaining"
    );
}

#[tokio::test]
async fn wrong_amount_is_unprocessable() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut body = srv.order_body("W-1", 2);
    body["payment_method"] = json!("cash");
    body["amount"] = json!("4.99");

    let res = post_order(&client, &srv, &body).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "amount_mismatch");
    assert_eq!(srv.services.store.payments_count().unwrap(), 0);
}

#[tokio::test]
async fn malformed_and_unknown_ids_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut body = srv.order_body("W-1", 1);
    body["product_id"] = json!("not-a-uuid");
    let res = post_order(&client, &srv, &body).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    body["product_id"] = json!(uuid::Uuid::now_v7().to_string());
    let res = post_order(&client, &srv, &body).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!("{}/orders/{}", srv.base_url, uuid::Uuid::now_v7()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn price_change_leaves_placed_lines_alone() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let placed: serde_json::Value = post_order(&client, &srv, &srv.order_body("ESP-100", 1))
        .await
        .json()
        .await
        .unwrap();

    let res = client
        .post(format!("{}/products/{}/price", srv.base_url, srv.product("ESP-100")))
        .json(&json!({ "price": "249.99" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let order: serde_json::Value = client
        .get(format!(
            "{}/orders/{}",
            srv.base_url,
            placed["order_id"].as_str().unwrap()
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(order["lines"][0]["unit_price"], "199.99");
}

#[tokio::test]
async fn undecodable_bodies_are_json_validation_errors() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut body = srv.order_body("W-1", 1);
    body["quantity"] = json!(-1);
    let res = post_order(&client, &srv, &body).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "validation");
    assert!(err["message"].as_str().unwrap().contains("quantity"));

    body.as_object_mut().unwrap().remove("quantity");
    let res = post_order(&client, &srv, &body).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(format!("{}/products/{}/price", srv.base_url, srv.product("W-1")))
        .json(&json!({ "price": 2.75 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "validation");

    let res = client
        .post(format!("{}/products/{}/restock", srv.base_url, srv.product("W-1")))
        .json(&json!({ "quantity": "ten" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    assert_eq!(srv.services.store.orders_count().unwrap(), 0);
}
