use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    JoinType, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
    sea_query::{Expr, SimpleExpr},
};
use tracing::info;

use crate::clients::Prediction;
use crate::entities::{complaints, prediction_log, status_history, users};
use crate::models::{Priority, Status};

/// Optional admin listing filters; all conditions AND together.
#[derive(Debug, Clone, Default)]
pub struct ComplaintFilters {
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub search: Option<String>,
}

/// Admin listing row: complaint joined with its submitter.
#[derive(Debug, Clone, FromQueryResult)]
pub struct AdminComplaintRow {
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

#[derive(Debug, FromQueryResult)]
struct GroupCountRow {
    label: String,
    count: i64,
}

/// Aggregates for the admin dashboard.
#[derive(Debug, Clone, Default)]
pub struct ComplaintCounts {
    pub total: u64,
    pub by_status: Vec<(Status, u64)>,
    pub by_priority: Vec<(Priority, u64)>,
}

/// Outcome of a status transition, for history reporting.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub old_status: String,
    pub new_status: String,
}

/// High sorts first, then Medium, Low, Other; ties break on newest first.
const PRIORITY_RANK_SQL: &str = "CASE \"complaints\".\"priority\" \
     WHEN 'High' THEN 1 WHEN 'Medium' THEN 2 WHEN 'Low' THEN 3 ELSE 4 END";

pub struct ComplaintRepository {
    conn: DatabaseConnection,
}

impl ComplaintRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a new complaint with status Registered.
    pub async fn insert(&self, user_id: i32, text: &str, priority: Priority) -> Result<i64> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = complaints::ActiveModel {
            user_id: Set(user_id),
            complaint_text: Set(text.to_string()),
            priority: Set(priority.as_str().to_string()),
            status: Set(Status::Registered.as_str().to_string()),
            submitted_at: Set(now.clone()),
            updated_at: Set(now),
            resolved_at: Set(None),
            ..Default::default()
        };

        let inserted = active
            .insert(&self.conn)
            .await
            .context("Failed to insert complaint")?;

        Ok(inserted.id)
    }

    /// Append-only record of the classifier's verdict at submission time.
    pub async fn log_prediction(&self, complaint_id: i64, prediction: &Prediction) -> Result<()> {
        let active = prediction_log::ActiveModel {
            complaint_id: Set(complaint_id),
            predicted_priority: Set(prediction.priority.as_str().to_string()),
            confidence_score: Set(prediction.confidence),
            model_version: Set(prediction.model_version.clone()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        prediction_log::Entity::insert(active)
            .exec(&self.conn)
            .await
            .context("Failed to log prediction")?;

        Ok(())
    }

    pub async fn get(&self, id: i64) -> Result<Option<complaints::Model>> {
        let complaint = complaints::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query complaint")?;

        Ok(complaint)
    }

    pub async fn get_with_user(&self, id: i64) -> Result<Option<AdminComplaintRow>> {
        let row = Self::joined_query()
            .filter(complaints::Column::Id.eq(id))
            .into_model::<AdminComplaintRow>()
            .one(&self.conn)
            .await
            .context("Failed to query complaint with submitter")?;

        Ok(row)
    }

    /// One user's complaints, newest first.
    pub async fn list_for_user(
        &self,
        user_id: i32,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<complaints::Model>, u64, u64)> {
        let paginator = complaints::Entity::find()
            .filter(complaints::Column::UserId.eq(user_id))
            .order_by_desc(complaints::Column::SubmittedAt)
            .paginate(&self.conn, page_size);

        let counts = paginator.num_items_and_pages().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, counts.number_of_items, counts.number_of_pages))
    }

    /// All complaints with submitter details, filtered and ordered by
    /// priority rank then submission time.
    pub async fn list_all(
        &self,
        filters: &ComplaintFilters,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<AdminComplaintRow>, u64, u64)> {
        let mut query = Self::joined_query();

        if let Some(priority) = filters.priority {
            query = query.filter(complaints::Column::Priority.eq(priority.as_str()));
        }
        if let Some(status) = filters.status {
            query = query.filter(complaints::Column::Status.eq(status.as_str()));
        }
        if let Some(search) = filters.search.as_deref() {
            // SQLite LIKE is already case-insensitive for ASCII.
            query = query.filter(
                Condition::any()
                    .add(complaints::Column::ComplaintText.contains(search))
                    .add(users::Column::FullName.contains(search))
                    .add(users::Column::Email.contains(search)),
            );
        }

        let rank: SimpleExpr = Expr::cust(PRIORITY_RANK_SQL).into();
        let paginator = query
            .order_by(rank, Order::Asc)
            .order_by_desc(complaints::Column::SubmittedAt)
            .into_model::<AdminComplaintRow>()
            .paginate(&self.conn, page_size);

        let counts = paginator.num_items_and_pages().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, counts.number_of_items, counts.number_of_pages))
    }

    fn joined_query() -> sea_orm::Select<complaints::Entity> {
        complaints::Entity::find()
            .select_only()
            .column(complaints::Column::Id)
            .column(complaints::Column::UserId)
            .column(complaints::Column::ComplaintText)
            .column(complaints::Column::Priority)
            .column(complaints::Column::Status)
            .column(complaints::Column::SubmittedAt)
            .column(complaints::Column::UpdatedAt)
            .column(complaints::Column::ResolvedAt)
            .column_as(users::Column::FullName, "full_name")
            .column_as(users::Column::Email, "email")
            .join(JoinType::InnerJoin, complaints::Relation::User.def())
    }

    /// Full ordered transition history, oldest first.
    pub async fn history(&self, complaint_id: i64) -> Result<Vec<status_history::Model>> {
        let history = status_history::Entity::find()
            .filter(status_history::Column::ComplaintId.eq(complaint_id))
            .order_by_asc(status_history::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query status history")?;

        Ok(history)
    }

    /// Set a complaint's status and append the matching history entry in
    /// one transaction. The prior status comes from the newest history
    /// entry, or the implicit initial "Registered" when none exists.
    ///
    /// Returns `None` when the complaint does not exist.
    pub async fn update_status(
        &self,
        complaint_id: i64,
        new_status: Status,
        admin_id: i32,
        notes: Option<&str>,
    ) -> Result<Option<StatusChange>> {
        let txn = self.conn.begin().await?;

        let Some(complaint) = complaints::Entity::find_by_id(complaint_id).one(&txn).await? else {
            txn.rollback().await?;
            return Ok(None);
        };

        let old_status = status_history::Entity::find()
            .filter(status_history::Column::ComplaintId.eq(complaint_id))
            .order_by_desc(status_history::Column::Id)
            .one(&txn)
            .await?
            .map_or_else(
                || Status::Registered.as_str().to_string(),
                |entry| entry.new_status,
            );

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: complaints::ActiveModel = complaint.into();
        active.status = Set(new_status.as_str().to_string());
        active.updated_at = Set(now.clone());
        if new_status == Status::Resolved {
            active.resolved_at = Set(Some(now.clone()));
        }
        active.update(&txn).await?;

        let entry = status_history::ActiveModel {
            complaint_id: Set(complaint_id),
            old_status: Set(Some(old_status.clone())),
            new_status: Set(new_status.as_str().to_string()),
            admin_id: Set(admin_id),
            notes: Set(notes.map(ToString::to_string)),
            changed_at: Set(now),
            ..Default::default()
        };
        entry.insert(&txn).await?;

        txn.commit().await?;

        info!(
            "Complaint {} status: {} -> {}",
            complaint_id, old_status, new_status
        );

        Ok(Some(StatusChange {
            old_status,
            new_status: new_status.as_str().to_string(),
        }))
    }

    /// Aggregate counts for the dashboard. Statuses or priorities with no
    /// complaints report zero.
    pub async fn counts(&self) -> Result<ComplaintCounts> {
        let total = complaints::Entity::find().count(&self.conn).await?;

        let status_rows = complaints::Entity::find()
            .select_only()
            .column_as(complaints::Column::Status, "label")
            .column_as(complaints::Column::Id.count(), "count")
            .group_by(complaints::Column::Status)
            .into_model::<GroupCountRow>()
            .all(&self.conn)
            .await?;

        let priority_rows = complaints::Entity::find()
            .select_only()
            .column_as(complaints::Column::Priority, "label")
            .column_as(complaints::Column::Id.count(), "count")
            .group_by(complaints::Column::Priority)
            .into_model::<GroupCountRow>()
            .all(&self.conn)
            .await?;

        let count_for = |rows: &[GroupCountRow], label: &str| {
            rows.iter()
                .find(|r| r.label == label)
                .map_or(0, |r| u64::try_from(r.count).unwrap_or(0))
        };

        let by_status = Status::ALL
            .into_iter()
            .map(|s| (s, count_for(&status_rows, s.as_str())))
            .collect();

        let by_priority = Priority::ALL
            .into_iter()
            .map(|p| (p, count_for(&priority_rows, p.as_str())))
            .collect();

        Ok(ComplaintCounts {
            total,
            by_status,
            by_priority,
        })
    }

    /// Most recently submitted complaints with submitter details.
    pub async fn recent(&self, limit: u64) -> Result<Vec<AdminComplaintRow>> {
        let rows = Self::joined_query()
            .order_by_desc(complaints::Column::SubmittedAt)
            .order_by_desc(complaints::Column::Id)
            .limit(limit)
            .into_model::<AdminComplaintRow>()
            .all(&self.conn)
            .await
            .context("Failed to query recent complaints")?;

        Ok(rows)
    }
}
