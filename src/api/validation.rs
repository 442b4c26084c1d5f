use std::str::FromStr;

use super::ApiError;
use crate::models::{Priority, Status};

pub fn parse_priority_filter(raw: Option<&str>) -> Result<Option<Priority>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Priority::from_str(value).map(Some).map_err(|()| {
            ApiError::validation(format!("Unknown priority filter: {}", value))
        }),
    }
}

pub fn parse_status_filter(raw: Option<&str>) -> Result<Option<Status>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Status::from_str(value)
            .map(Some)
            .map_err(|()| ApiError::validation(format!("Unknown status filter: {}", value))),
    }
}

/// Blank search terms mean "no search", not "match everything blank".
#[must_use]
pub fn normalize_search(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

pub fn validate_complaint_id(id: i64) -> Result<i64, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid complaint ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}
