use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::clients::Prediction;
use crate::config::AuthConfig;
use crate::entities::{complaints, sessions, status_history};
use crate::models::{Priority, Status};

pub mod migrator;
pub mod repositories;

pub use repositories::complaint::{
    AdminComplaintRow, ComplaintCounts, ComplaintFilters, StatusChange,
};
pub use repositories::session::generate_session_token;
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn session_repo(&self) -> repositories::session::SessionRepository {
        repositories::session::SessionRepository::new(self.conn.clone())
    }

    fn complaint_repo(&self) -> repositories::complaint::ComplaintRepository {
        repositories::complaint::ComplaintRepository::new(self.conn.clone())
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn create_user(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
        phone: Option<&str>,
        auth_config: &AuthConfig,
    ) -> Result<i32> {
        self.user_repo()
            .create(full_name, email, password, phone, auth_config)
            .await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_email_with_password(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>> {
        self.user_repo().get_by_email_with_password(email).await
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        self.user_repo().email_exists(email).await
    }

    pub async fn touch_last_login(&self, id: i32) -> Result<()> {
        self.user_repo().touch_last_login(id).await
    }

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------

    pub async fn replace_session(
        &self,
        user_id: i32,
        token: &str,
        expires_at: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<()> {
        self.session_repo()
            .replace_for_user(user_id, token, expires_at, ip_address, user_agent)
            .await
    }

    pub async fn get_session_by_token(&self, token: &str) -> Result<Option<sessions::Model>> {
        self.session_repo().get_by_token(token).await
    }

    pub async fn touch_session(&self, session: sessions::Model, expires_at: &str) -> Result<()> {
        self.session_repo().touch(session, expires_at).await
    }

    pub async fn delete_session(&self, token: &str) -> Result<()> {
        self.session_repo().delete_by_token(token).await
    }

    pub async fn delete_sessions_for_user(&self, user_id: i32) -> Result<()> {
        self.session_repo().delete_for_user(user_id).await
    }

    pub async fn sweep_expired_sessions(&self) -> Result<u64> {
        self.session_repo().sweep_expired().await
    }

    // ------------------------------------------------------------------
    // Complaints
    // ------------------------------------------------------------------

    pub async fn insert_complaint(
        &self,
        user_id: i32,
        text: &str,
        priority: Priority,
    ) -> Result<i64> {
        self.complaint_repo().insert(user_id, text, priority).await
    }

    pub async fn log_prediction(&self, complaint_id: i64, prediction: &Prediction) -> Result<()> {
        self.complaint_repo()
            .log_prediction(complaint_id, prediction)
            .await
    }

    pub async fn get_complaint(&self, id: i64) -> Result<Option<complaints::Model>> {
        self.complaint_repo().get(id).await
    }

    pub async fn get_complaint_with_user(&self, id: i64) -> Result<Option<AdminComplaintRow>> {
        self.complaint_repo().get_with_user(id).await
    }

    pub async fn list_complaints_for_user(
        &self,
        user_id: i32,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<complaints::Model>, u64, u64)> {
        self.complaint_repo()
            .list_for_user(user_id, page, page_size)
            .await
    }

    pub async fn list_all_complaints(
        &self,
        filters: &ComplaintFilters,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<AdminComplaintRow>, u64, u64)> {
        self.complaint_repo()
            .list_all(filters, page, page_size)
            .await
    }

    pub async fn complaint_history(&self, complaint_id: i64) -> Result<Vec<status_history::Model>> {
        self.complaint_repo().history(complaint_id).await
    }

    pub async fn update_complaint_status(
        &self,
        complaint_id: i64,
        new_status: Status,
        admin_id: i32,
        notes: Option<&str>,
    ) -> Result<Option<StatusChange>> {
        self.complaint_repo()
            .update_status(complaint_id, new_status, admin_id, notes)
            .await
    }

    pub async fn complaint_counts(&self) -> Result<ComplaintCounts> {
        self.complaint_repo().counts().await
    }

    pub async fn recent_complaints(&self, limit: u64) -> Result<Vec<AdminComplaintRow>> {
        self.complaint_repo().recent(limit).await
    }
}
