//! Domain service for the complaint lifecycle: submission, listing,
//! status transitions, details, and dashboard aggregates.

use serde::Serialize;
use thiserror::Error;

use crate::models::Priority;

#[derive(Debug, Error)]
pub enum ComplaintError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ComplaintError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ComplaintError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// What the submitter gets back: the new id and the assigned priority.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub complaint_id: i64,
    pub priority: Priority,
}

/// A complaint as its owner sees it.
#[derive(Debug, Clone, Serialize)]
pub struct ComplaintSummary {
    pub id: i64,
    pub complaint_text: String,
    pub priority: String,
    pub status: String,
    pub submitted_at: String,
    pub updated_at: String,
    pub resolved_at: Option<String>,
}

/// A complaint as an admin sees it, with submitter details.
#[derive(Debug, Clone, Serialize)]
pub struct AdminComplaintSummary {
    pub id: i64,
    pub user_id: i32,
    pub complaint_text: String,
    pub priority: String,
    pub status: String,
    pub submitted_at: String,
    pub updated_at: String,
    pub resolved_at: Option<String>,
    pub full_name: String,
    pub email: String,
}

/// Shared pagination envelope: fixed page size, 1-based page numbers.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub complaints: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub old_status: Option<String>,
    pub new_status: String,
    pub admin_id: i32,
    pub notes: Option<String>,
    pub changed_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplaintDetails {
    #[serde(flatten)]
    pub complaint: AdminComplaintSummary,
    /// Human-readable time since submission (until resolution, once
    /// resolved).
    pub elapsed: String,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub total_complaints: u64,
    pub registered: u64,
    pub under_review: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub high_priority: u64,
    pub medium_priority: u64,
    pub low_priority: u64,
    pub other_priority: u64,
    pub recent: Vec<AdminComplaintSummary>,
}

/// Domain service trait for complaints.
#[async_trait::async_trait]
pub trait ComplaintService: Send + Sync {
    /// Classifies and persists a new complaint.
    ///
    /// # Errors
    ///
    /// Returns [`ComplaintError::Validation`] when the text trims to
    /// empty. Classifier failure is NOT an error: the complaint lands
    /// with the default priority.
    async fn submit(&self, user_id: i32, text: &str) -> Result<SubmissionReceipt, ComplaintError>;

    /// One user's complaints, newest first.
    async fn list_for_user(
        &self,
        user_id: i32,
        page: u64,
    ) -> Result<Page<ComplaintSummary>, ComplaintError>;

    /// All complaints (admin), filtered, ordered by priority rank then
    /// submission time.
    async fn list_all(
        &self,
        filters: crate::db::ComplaintFilters,
        page: u64,
    ) -> Result<Page<AdminComplaintSummary>, ComplaintError>;

    /// Sets a new status and appends the history entry atomically.
    ///
    /// # Errors
    ///
    /// Returns [`ComplaintError::Validation`] for an unknown status label
    /// and [`ComplaintError::NotFound`] for a missing complaint.
    async fn update_status(
        &self,
        complaint_id: i64,
        new_status: &str,
        admin_id: i32,
        notes: Option<&str>,
    ) -> Result<(), ComplaintError>;

    /// Complaint, computed elapsed time, and full ordered history.
    async fn get_details(&self, complaint_id: i64) -> Result<ComplaintDetails, ComplaintError>;

    /// Aggregate counts plus the most recent complaints.
    async fn statistics(&self) -> Result<Statistics, ComplaintError>;
}
