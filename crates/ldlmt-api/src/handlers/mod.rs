//! Example handlers protected by the gate.

use axum::{response::IntoResponse, Json};
use serde_json::json;
use std::time::Duration;

/// Simulated duration of a heavy request.
const HEAVY_WORK: Duration = Duration::from_millis(200);

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn light() -> impl IntoResponse {
    Json(json!({ "result": "light" }))
}

pub async fn heavy() -> impl IntoResponse {
    tokio::time::sleep(HEAVY_WORK).await;
    Json(json!({ "result": "heavy", "took_ms": HEAVY_WORK.as_millis() as u64 }))
}
