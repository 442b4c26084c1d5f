//! Domain service for registration, login, and session bookkeeping.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to authentication operations.
///
/// `InvalidCredentials` carries the same user-visible message for an
/// unknown email and a wrong password, so callers cannot probe which
/// accounts exist. `SessionExpired` differs from it in message text only;
/// both map to 401.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is deactivated")]
    AccountDeactivated,

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Successful login: role for the client, token for the session cookie.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub user_id: i32,
    pub role: String,
    #[serde(skip)]
    pub token: String,
}

/// The user a validated session belongs to, attached to each
/// authenticated request.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub role: String,
}

impl AuthenticatedUser {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Client metadata captured on login and stored with the session record.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a new account with role "user" and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for a malformed or duplicate
    /// email, or a password shorter than 8 characters.
    async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
        phone: Option<&str>,
    ) -> Result<i32, AuthError>;

    /// Verifies credentials, records the login time, and replaces the
    /// user's session with a fresh one.
    async fn login(
        &self,
        email: &str,
        password: &str,
        client: ClientInfo,
    ) -> Result<LoginResult, AuthError>;

    /// Deletes the session for a token. Idempotent.
    async fn logout(&self, token: &str) -> Result<(), AuthError>;

    /// Validates a session token and slides its idle-expiry window
    /// forward. Expired sessions are removed on sight.
    async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;

    /// Deletes all sessions past their expiry; returns how many.
    async fn sweep_sessions(&self) -> Result<u64, AuthError>;
}
