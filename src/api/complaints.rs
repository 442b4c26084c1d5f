use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::models::Priority;
use crate::services::{AuthenticatedUser, ComplaintSummary, Page};

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub complaint_text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub complaint_id: i64,
    pub priority: Priority,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
}

/// POST /api/complaints
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<SubmitRequest>,
) -> Result<Json<ApiResponse<SubmitResponse>>, ApiError> {
    let receipt = state
        .complaint_service()
        .submit(user.id, &payload.complaint_text)
        .await?;

    Ok(Json(ApiResponse::success(
        "Complaint submitted successfully",
        SubmitResponse {
            complaint_id: receipt.complaint_id,
            priority: receipt.priority,
        },
    )))
}

/// GET /api/complaints?page=N
pub async fn list_mine(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Page<ComplaintSummary>>>, ApiError> {
    let page = state
        .complaint_service()
        .list_for_user(user.id, query.page.unwrap_or(1))
        .await?;

    Ok(Json(ApiResponse::success("Complaints retrieved", page)))
}
