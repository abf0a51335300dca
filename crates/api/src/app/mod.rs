//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, coordinator, event bus, demo seeding
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request parsing and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(services))
}
