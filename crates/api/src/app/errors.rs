use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockflow_infra::{PlacementError, StoreError};

pub fn placement_error_to_response(err: PlacementError) -> axum::response::Response {
    let status = match &err {
        PlacementError::ProductNotFound(_) => StatusCode::NOT_FOUND,
        PlacementError::InsufficientStock { .. } => StatusCode::CONFLICT,
        PlacementError::InvalidAddress { .. } | PlacementError::AmountMismatch { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PlacementError::Busy(_) => StatusCode::SERVICE_UNAVAILABLE,
        PlacementError::Validation(_) => StatusCode::BAD_REQUEST,
        PlacementError::NegativeStockViolation { .. }
        | PlacementError::Conflict(_)
        | PlacementError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    json_error(status, err.kind(), err.to_string())
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    tracing::error!(error = %err, "store read failed");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "store", err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn invalid_id(what: &str) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id"))
}

pub fn not_found(what: &str) -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
}

/// Malformed or mistyped request body (bad JSON, negative quantity, ...).
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation", rejection.body_text())
}

/// A blocking placement task panicked or was cancelled.
pub fn join_error_to_response(err: tokio::task::JoinError) -> axum::response::Response {
    tracing::error!(error = %err, "placement task failed");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal",
        "placement task failed",
    )
}
