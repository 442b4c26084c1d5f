//! `SeaORM` implementation of the `AuthService` trait.

use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use regex::Regex;
use tracing::info;

use crate::config::AuthConfig;
use crate::db::repositories::user::UserRepository;
use crate::db::{Store, generate_session_token};
use crate::services::auth_service::{
    AuthError, AuthService, AuthenticatedUser, ClientInfo, LoginResult,
};

const MIN_PASSWORD_LENGTH: usize = 8;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid regex pattern defined in code")
    })
}

pub struct SeaOrmAuthService {
    store: Store,
    config: AuthConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, config: AuthConfig) -> Self {
        Self { store, config }
    }

    fn session_expiry(&self) -> String {
        let timeout = i64::try_from(self.config.session_timeout_seconds).unwrap_or(3600);
        (Utc::now() + Duration::seconds(timeout)).to_rfc3339()
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
        phone: Option<&str>,
    ) -> Result<i32, AuthError> {
        if !email_regex().is_match(email) {
            return Err(AuthError::Validation("Invalid email format".to_string()));
        }

        if self.store.email_exists(email).await? {
            return Err(AuthError::Validation(
                "Email already registered".to_string(),
            ));
        }

        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        let user_id = self
            .store
            .create_user(full_name, email, password, phone, &self.config)
            .await?;

        info!("Registered user {} ({})", user_id, email);

        Ok(user_id)
    }

    async fn login(
        &self,
        email: &str,
        password: &str,
        client: ClientInfo,
    ) -> Result<LoginResult, AuthError> {
        // Unknown email and wrong password take the same error path.
        let Some((user, password_hash)) =
            self.store.get_user_by_email_with_password(email).await?
        else {
            return Err(AuthError::InvalidCredentials);
        };

        if !user.is_active {
            return Err(AuthError::AccountDeactivated);
        }

        let is_valid =
            UserRepository::verify_password(password_hash, password.to_string()).await?;
        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        self.store.touch_last_login(user.id).await?;

        let token = generate_session_token();
        self.store
            .replace_session(
                user.id,
                &token,
                &self.session_expiry(),
                client.ip_address.as_deref(),
                client.user_agent.as_deref(),
            )
            .await?;

        info!("User {} logged in", user.id);

        Ok(LoginResult {
            user_id: user.id,
            role: user.role,
            token,
        })
    }

    async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.store.delete_session(token).await?;
        Ok(())
    }

    async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let Some(session) = self.store.get_session_by_token(token).await? else {
            return Err(AuthError::NotAuthenticated);
        };

        let now = Utc::now().to_rfc3339();
        if session.expires_at < now {
            self.store.delete_session(token).await?;
            return Err(AuthError::SessionExpired);
        }

        let user_id = session.user_id;
        self.store
            .touch_session(session, &self.session_expiry())
            .await?;

        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::NotAuthenticated)?;

        if !user.is_active {
            return Err(AuthError::AccountDeactivated);
        }

        Ok(AuthenticatedUser {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            role: user.role,
        })
    }

    async fn sweep_sessions(&self) -> Result<u64, AuthError> {
        let swept = self.store.sweep_expired_sessions().await?;
        Ok(swept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_plain_addresses() {
        assert!(email_regex().is_match("user@example.com"));
        assert!(email_regex().is_match("a.b+c@sub.domain.org"));
    }

    #[test]
    fn email_regex_rejects_malformed_addresses() {
        assert!(!email_regex().is_match("not-an-email"));
        assert!(!email_regex().is_match("missing@tld"));
        assert!(!email_regex().is_match("two@@example.com"));
        assert!(!email_regex().is_match("spaces in@example.com"));
    }
}
