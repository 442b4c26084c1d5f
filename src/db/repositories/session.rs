use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::debug;

use crate::entities::sessions;

/// Generate an opaque session token (64 character hex string).
#[must_use]
pub fn generate_session_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

pub struct SessionRepository {
    conn: DatabaseConnection,
}

impl SessionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Replace whatever session the user had with a fresh one. A login on
    /// a second device silently invalidates the first.
    pub async fn replace_for_user(
        &self,
        user_id: i32,
        token: &str,
        expires_at: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<()> {
        let txn = self.conn.begin().await?;

        sessions::Entity::delete_by_id(user_id).exec(&txn).await?;

        let active = sessions::ActiveModel {
            user_id: Set(user_id),
            token: Set(token.to_string()),
            expires_at: Set(expires_at.to_string()),
            ip_address: Set(ip_address.map(ToString::to_string)),
            user_agent: Set(user_agent.map(ToString::to_string)),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };
        active.insert(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    pub async fn get_by_token(&self, token: &str) -> Result<Option<sessions::Model>> {
        let session = sessions::Entity::find()
            .filter(sessions::Column::Token.eq(token))
            .one(&self.conn)
            .await
            .context("Failed to query session by token")?;

        Ok(session)
    }

    /// Slide the idle-expiry window forward for an active session.
    pub async fn touch(&self, session: sessions::Model, expires_at: &str) -> Result<()> {
        let mut active: sessions::ActiveModel = session.into();
        active.expires_at = Set(expires_at.to_string());
        active.update(&self.conn).await?;
        Ok(())
    }

    /// Idempotent: deleting an absent token is not an error.
    pub async fn delete_by_token(&self, token: &str) -> Result<()> {
        sessions::Entity::delete_many()
            .filter(sessions::Column::Token.eq(token))
            .exec(&self.conn)
            .await
            .context("Failed to delete session")?;

        Ok(())
    }

    pub async fn delete_for_user(&self, user_id: i32) -> Result<()> {
        sessions::Entity::delete_by_id(user_id)
            .exec(&self.conn)
            .await
            .context("Failed to delete session for user")?;

        Ok(())
    }

    /// Delete every session past its expiry. Timestamps are RFC 3339 UTC
    /// strings, so lexicographic comparison matches chronological order.
    pub async fn sweep_expired(&self) -> Result<u64> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::ExpiresAt.lt(now.as_str()))
            .exec(&self.conn)
            .await
            .context("Failed to sweep expired sessions")?;

        if result.rows_affected > 0 {
            debug!("Swept {} expired sessions", result.rows_affected);
        }

        Ok(result.rows_affected)
    }
}
