// src/handlers/health.rs

use axum::{response::IntoResponse, Json};
use serde_json::json;

// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Servidor no ar")
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
