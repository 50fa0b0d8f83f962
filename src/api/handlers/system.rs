//! System endpoints: health check and slot catalog.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::SlotCatalogResponse;
use crate::app_state::AppState;
use crate::domain::Slot;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// `GET /config/slots` — The fixed hour markers of a clinic day.
#[utoipa::path(
    get,
    path = "/config/slots",
    tag = "System",
    summary = "List bookable slots",
    description = "Returns every hourly slot marker from 09:00 to 20:00.",
    responses(
        (status = 200, description = "Slot catalog", body = SlotCatalogResponse),
    )
)]
pub async fn slots_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(SlotCatalogResponse {
            slots: Slot::all().map(|s| s.to_string()).collect(),
            slot_minutes: 60,
        }),
    )
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/slots", get(slots_handler))
}
