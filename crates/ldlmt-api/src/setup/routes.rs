//! Route configuration and setup

use crate::handlers;
use axum::{routing::get, Router};
use ldlmt_core::AdmissionGate;
use ldlmt_infra::apply;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Capacity units charged per request on `/light`.
pub const LIGHT_WEIGHT: u32 = 1;
/// Capacity units charged per request on `/heavy`.
pub const HEAVY_WEIGHT: u32 = 5;

/// Setup all application routes
pub fn setup_routes(gate: &Arc<AdmissionGate>) -> Router {
    let config = gate.config();
    tracing::info!(
        capacity = config.capacity,
        max_waiters = config.max_waiters,
        max_wait_ms = config.max_wait.as_millis() as u64,
        light_weight = LIGHT_WEIGHT,
        heavy_weight = HEAVY_WEIGHT,
        "Admission gate configured"
    );

    Router::new()
        .route("/health", get(handlers::health))
        .route("/light", apply(gate, LIGHT_WEIGHT, get(handlers::light)))
        .route("/heavy", apply(gate, HEAVY_WEIGHT, get(handlers::heavy)))
        .layer(TraceLayer::new_for_http())
}
