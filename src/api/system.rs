use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiResponse, AppState};

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: bool,
    pub classifier: bool,
    pub uptime_seconds: u64,
    pub version: &'static str,
}

/// GET /api/health
///
/// The classifier being down does not degrade health: submissions still
/// succeed on the fallback priority.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthStatus>> {
    let database = state.store().ping().await.is_ok();
    let classifier = state.shared.classifier.is_reachable().await;

    let status = if database { "healthy" } else { "degraded" };

    Json(ApiResponse::success(
        "Health check",
        HealthStatus {
            status,
            database,
            classifier,
            uptime_seconds: state.start_time.elapsed().as_secs(),
            version: env!("CARGO_PKG_VERSION"),
        },
    ))
}
