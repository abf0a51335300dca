use std::sync::Arc;

use axum::{
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stockflow_core::OrderId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(place_order))
        .route("/:id", get(get_order))
}

pub async fn place_order(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::PlaceOrderRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let command = match body.into_command() {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    // Placement blocks on the product's row lock; keep it off the async workers.
    let placed = match tokio::task::spawn_blocking(move || services.coordinator.place_order(command))
        .await
    {
        Ok(Ok(placed)) => placed,
        Ok(Err(e)) => return errors::placement_error_to_response(e),
        Err(e) => return errors::join_error_to_response(e),
    };

    (StatusCode::CREATED, Json(dto::placed_to_json(&placed))).into_response()
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::invalid_id("order"),
    };

    let order = match services.store.order(order_id) {
        Ok(Some(order)) => order,
        Ok(None) => return errors::not_found("order"),
        Err(e) => return errors::store_error_to_response(e),
    };
    let payments = match services.store.payments_for_order(order_id) {
        Ok(p) => p,
        Err(e) => return errors::store_error_to_response(e),
    };

    (StatusCode::OK, Json(dto::order_to_json(&order, &payments))).into_response()
}
