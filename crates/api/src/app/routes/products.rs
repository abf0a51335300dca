use std::sync::Arc;

use axum::{
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use stockflow_core::ProductId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/:id", get(get_product))
        .route("/:id/alerts", get(list_alerts))
        .route("/:id/restock", post(restock))
        .route("/:id/price", post(change_price))
}

fn parse_product_id(id: &str) -> Result<ProductId, axum::response::Response> {
    id.parse().map_err(|_| errors::invalid_id("product"))
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id = match parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.store.product(product_id) {
        Ok(Some(product)) => (StatusCode::OK, Json(dto::product_to_json(&product))).into_response(),
        Ok(None) => errors::not_found("product"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_alerts(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id = match parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.store.product(product_id) {
        Ok(Some(_)) => {}
        Ok(None) => return errors::not_found("product"),
        Err(e) => return errors::store_error_to_response(e),
    }

    match services.store.alerts_for_product(product_id) {
        Ok(alerts) => {
            let items = alerts.iter().map(dto::alert_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn restock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::RestockRequest>, JsonRejection>,
) -> axum::response::Response {
    let product_id = match parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let restocked_on = body.restocked_on.unwrap_or_else(|| Utc::now().date_naive());

    match tokio::task::spawn_blocking(move || {
        services
            .coordinator
            .restock(product_id, body.quantity, restocked_on)
    })
    .await
    {
        Ok(Ok(product)) => (StatusCode::OK, Json(dto::product_to_json(&product))).into_response(),
        Ok(Err(e)) => errors::placement_error_to_response(e),
        Err(e) => errors::join_error_to_response(e),
    }
}

pub async fn change_price(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::ChangePriceRequest>, JsonRejection>,
) -> axum::response::Response {
    let product_id = match parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let price = match dto::parse_money(&body.price) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    match tokio::task::spawn_blocking(move || services.coordinator.change_price(product_id, price))
        .await
    {
        Ok(Ok(product)) => (StatusCode::OK, Json(dto::product_to_json(&product))).into_response(),
        Ok(Err(e)) => errors::placement_error_to_response(e),
        Err(e) => errors::join_error_to_response(e),
    }
}
