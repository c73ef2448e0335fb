pub mod error;
pub mod identity;
pub mod routes;
pub mod state;

use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full Axum router for the storefront API.
/// Used by main.rs and integration tests.
pub fn build_router(state: Arc<state::AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        // K8s-style aliases (kept simple: if the process is serving, it's "ready").
        .route("/healthz", get(health))
        .route("/readyz", get(health))
        .nest("/v1", routes::coupons::router())
        .nest("/v1", routes::orders::router())
        .with_state(state)
}
