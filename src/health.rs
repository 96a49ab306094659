use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use tracing::warn;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(liveness))
        .route("/health/ready", get(readiness))
}

/// Liveness probe: the process is up and serving.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is alive")),
    tag = "health"
)]
pub async fn liveness() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Readiness probe: the database answers a ping.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready"),
        (status = 503, description = "Database unreachable")
    ),
    tag = "health"
)]
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match crate::db::ping(state.db_pool.as_ref()).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
