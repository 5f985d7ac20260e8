use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use serde_json::json;

use crate::state::AppState;

/// Liveness response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
    /// Always `"healthy"` while the process is serving.
    pub status: &'static str,
    /// RFC 3339 time the response was produced.
    pub timestamp: String,
}

/// GET / -- liveness check.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Quick AI Server is live",
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Fallback for unknown routes.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "Route not found" })),
    )
}

/// Mount health check routes at the root.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}
