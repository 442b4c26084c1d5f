//! `SeaORM` implementation of the `ComplaintService` trait.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::clients::ClassifierClient;
use crate::db::{AdminComplaintRow, ComplaintFilters, Store};
use crate::entities::complaints;
use crate::models::{Priority, Status};
use crate::services::complaint_service::{
    AdminComplaintSummary, ComplaintDetails, ComplaintError, ComplaintService, ComplaintSummary,
    HistoryEntry, Page, Statistics, SubmissionReceipt,
};

pub struct SeaOrmComplaintService {
    store: Store,
    classifier: Arc<ClassifierClient>,
    page_size: u64,
    recent_limit: u64,
}

impl SeaOrmComplaintService {
    #[must_use]
    pub const fn new(
        store: Store,
        classifier: Arc<ClassifierClient>,
        page_size: u64,
        recent_limit: u64,
    ) -> Self {
        Self {
            store,
            classifier,
            page_size,
            recent_limit,
        }
    }
}

fn map_model(model: complaints::Model) -> ComplaintSummary {
    ComplaintSummary {
        id: model.id,
        complaint_text: model.complaint_text,
        priority: model.priority,
        status: model.status,
        submitted_at: model.submitted_at,
        updated_at: model.updated_at,
        resolved_at: model.resolved_at,
    }
}

fn map_admin_row(row: AdminComplaintRow) -> AdminComplaintSummary {
    AdminComplaintSummary {
        id: row.id,
        user_id: row.user_id,
        complaint_text: row.complaint_text,
        priority: row.priority,
        status: row.status,
        submitted_at: row.submitted_at,
        updated_at: row.updated_at,
        resolved_at: row.resolved_at,
        full_name: row.full_name,
        email: row.email,
    }
}

/// Render the time between submission and resolution (or now) in the
/// largest two sensible units.
fn elapsed_description(submitted_at: &str, resolved_at: Option<&str>) -> String {
    let Ok(start) = DateTime::parse_from_rfc3339(submitted_at) else {
        return "unknown".to_string();
    };

    let end = resolved_at
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map_or_else(Utc::now, |dt| dt.with_timezone(&Utc));

    let seconds = (end - start.with_timezone(&Utc)).num_seconds().max(0);

    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;

    if days > 0 {
        format!("{days} days, {hours} hours")
    } else if hours > 0 {
        format!("{hours} hours, {minutes} minutes")
    } else {
        format!("{minutes} minutes")
    }
}

#[async_trait]
impl ComplaintService for SeaOrmComplaintService {
    async fn submit(&self, user_id: i32, text: &str) -> Result<SubmissionReceipt, ComplaintError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ComplaintError::Validation(
                "Complaint text is required".to_string(),
            ));
        }

        let prediction = self.classifier.classify(text).await;

        let complaint_id = self
            .store
            .insert_complaint(user_id, text, prediction.priority)
            .await?;

        // A lost prediction log must not undo the complaint itself.
        if let Err(e) = self.store.log_prediction(complaint_id, &prediction).await {
            warn!("Failed to log prediction for complaint {complaint_id}: {e}");
        }

        info!(
            "Complaint {} submitted by user {} with priority {}",
            complaint_id, user_id, prediction.priority
        );

        Ok(SubmissionReceipt {
            complaint_id,
            priority: prediction.priority,
        })
    }

    async fn list_for_user(
        &self,
        user_id: i32,
        page: u64,
    ) -> Result<Page<ComplaintSummary>, ComplaintError> {
        let page = page.max(1);
        let (items, total, pages) = self
            .store
            .list_complaints_for_user(user_id, page, self.page_size)
            .await?;

        Ok(Page {
            complaints: items.into_iter().map(map_model).collect(),
            total,
            page,
            pages,
        })
    }

    async fn list_all(
        &self,
        filters: ComplaintFilters,
        page: u64,
    ) -> Result<Page<AdminComplaintSummary>, ComplaintError> {
        let page = page.max(1);
        let (items, total, pages) = self
            .store
            .list_all_complaints(&filters, page, self.page_size)
            .await?;

        Ok(Page {
            complaints: items.into_iter().map(map_admin_row).collect(),
            total,
            page,
            pages,
        })
    }

    async fn update_status(
        &self,
        complaint_id: i64,
        new_status: &str,
        admin_id: i32,
        notes: Option<&str>,
    ) -> Result<(), ComplaintError> {
        let new_status = Status::from_str(new_status).map_err(|()| {
            ComplaintError::Validation(format!("Unknown status: {new_status}"))
        })?;

        let change = self
            .store
            .update_complaint_status(complaint_id, new_status, admin_id, notes)
            .await?;

        match change {
            Some(_) => Ok(()),
            None => Err(ComplaintError::NotFound(format!(
                "Complaint {complaint_id} not found"
            ))),
        }
    }

    async fn get_details(&self, complaint_id: i64) -> Result<ComplaintDetails, ComplaintError> {
        let row = self
            .store
            .get_complaint_with_user(complaint_id)
            .await?
            .ok_or_else(|| {
                ComplaintError::NotFound(format!("Complaint {complaint_id} not found"))
            })?;

        let history = self
            .store
            .complaint_history(complaint_id)
            .await?
            .into_iter()
            .map(|entry| HistoryEntry {
                old_status: entry.old_status,
                new_status: entry.new_status,
                admin_id: entry.admin_id,
                notes: entry.notes,
                changed_at: entry.changed_at,
            })
            .collect();

        let elapsed = elapsed_description(&row.submitted_at, row.resolved_at.as_deref());

        Ok(ComplaintDetails {
            complaint: map_admin_row(row),
            elapsed,
            history,
        })
    }

    async fn statistics(&self) -> Result<Statistics, ComplaintError> {
        let counts = self.store.complaint_counts().await?;
        let recent = self.store.recent_complaints(self.recent_limit).await?;

        let status_count = |status: Status| {
            counts
                .by_status
                .iter()
                .find(|(s, _)| *s == status)
                .map_or(0, |(_, n)| *n)
        };
        let priority_count = |priority: Priority| {
            counts
                .by_priority
                .iter()
                .find(|(p, _)| *p == priority)
                .map_or(0, |(_, n)| *n)
        };

        Ok(Statistics {
            total_complaints: counts.total,
            registered: status_count(Status::Registered),
            under_review: status_count(Status::UnderReview),
            in_progress: status_count(Status::InProgress),
            resolved: status_count(Status::Resolved),
            high_priority: priority_count(Priority::High),
            medium_priority: priority_count(Priority::Medium),
            low_priority: priority_count(Priority::Low),
            other_priority: priority_count(Priority::Other),
            recent: recent.into_iter().map(map_admin_row).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_renders_days_and_hours() {
        let start = "2026-01-01T00:00:00+00:00";
        let end = Some("2026-01-03T05:30:00+00:00");
        assert_eq!(elapsed_description(start, end), "2 days, 5 hours");
    }

    #[test]
    fn elapsed_renders_sub_hour_spans_in_minutes() {
        let start = "2026-01-01T00:00:00+00:00";
        let end = Some("2026-01-01T00:45:10+00:00");
        assert_eq!(elapsed_description(start, end), "45 minutes");
    }

    #[test]
    fn elapsed_tolerates_garbage_timestamps() {
        assert_eq!(elapsed_description("not a date", None), "unknown");
    }
}
