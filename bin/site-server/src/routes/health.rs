//! Health / liveness endpoint.

use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::contact::record::iso8601;
use crate::schemas::HealthResponse;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health), components(schemas(HealthResponse)))]
pub struct HealthApi;

/// Register health-check routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

/// Liveness endpoint.
///
/// Returns `{"status": "ok", "timestamp": "..."}` with HTTP 200. Stateless;
/// uptime monitors should poll this endpoint.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is alive", body = HealthResponse)
    )
)]
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
        timestamp: iso8601(Utc::now()),
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
