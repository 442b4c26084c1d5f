use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{
    normalize_search, parse_priority_filter, parse_status_filter, validate_complaint_id,
};
use super::{ApiError, ApiResponse, AppState};
use crate::db::ComplaintFilters;
use crate::services::{
    AdminComplaintSummary, AuthenticatedUser, ComplaintDetails, Page, Statistics,
};

#[derive(Deserialize)]
pub struct AdminListQuery {
    pub priority: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub complaint_id: i64,
    pub new_status: String,
    pub notes: Option<String>,
}

/// GET /api/admin/complaints?priority=&status=&search=&page=
pub async fn list_complaints(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<ApiResponse<Page<AdminComplaintSummary>>>, ApiError> {
    let filters = ComplaintFilters {
        priority: parse_priority_filter(query.priority.as_deref())?,
        status: parse_status_filter(query.status.as_deref())?,
        search: normalize_search(query.search.as_deref()),
    };

    let page = state
        .complaint_service()
        .list_all(filters, query.page.unwrap_or(1))
        .await?;

    Ok(Json(ApiResponse::success("Complaints retrieved", page)))
}

/// POST /api/admin/complaints/status
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthenticatedUser>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    validate_complaint_id(payload.complaint_id)?;

    state
        .complaint_service()
        .update_status(
            payload.complaint_id,
            &payload.new_status,
            admin.id,
            payload.notes.as_deref(),
        )
        .await?;

    Ok(Json(ApiResponse::success_empty(
        "Complaint status updated successfully",
    )))
}

/// GET /api/admin/complaints/{id}
pub async fn complaint_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ComplaintDetails>>, ApiError> {
    validate_complaint_id(id)?;

    let details = state.complaint_service().get_details(id).await?;

    Ok(Json(ApiResponse::success(
        "Details retrieved successfully",
        details,
    )))
}

/// GET /api/admin/stats
pub async fn statistics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Statistics>>, ApiError> {
    let stats = state.complaint_service().statistics().await?;

    Ok(Json(ApiResponse::success("Statistics retrieved", stats)))
}
