// src/handlers/health.rs

use axum::{Json, response::IntoResponse};
use serde_json::json;

/// Liveness probe.
pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Mini Course Generator API" }))
}
