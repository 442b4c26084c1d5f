use axum::{
    Json,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState};
use crate::services::{AuthenticatedUser, ClientInfo};

/// Session-cookie key holding the opaque session token.
const SESSION_TOKEN_KEY: &str = "token";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: i32,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub role: String,
    /// Returned for clients that authenticate with the `X-Session-Token`
    /// header instead of the cookie.
    pub token: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Authentication middleware. Resolves the session token from:
/// 1. The session cookie (web UI)
/// 2. The `X-Session-Token` header (API clients)
///
/// A valid token slides the idle-expiry window and attaches the owning
/// user to the request.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&session, request.headers())
        .await
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    let user = state.auth_service().authenticate(&token).await?;

    tracing::Span::current().record("user_id", user.id);
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Role check for `/admin` routes; runs after `auth_middleware`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let is_admin = request
        .extensions()
        .get::<AuthenticatedUser>()
        .is_some_and(AuthenticatedUser::is_admin);

    if !is_admin {
        return Err(ApiError::Unauthorized("Admin access required".to_string()));
    }

    Ok(next.run(request).await)
}

async fn extract_token(session: &Session, headers: &HeaderMap) -> Option<String> {
    if let Ok(Some(token)) = session.get::<String>(SESSION_TOKEN_KEY).await {
        return Some(token);
    }

    headers
        .get("X-Session-Token")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
}

fn client_info(headers: &HeaderMap) -> ClientInfo {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string());

    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    ClientInfo {
        ip_address,
        user_agent,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<RegisterResponse>>, ApiError> {
    if payload.full_name.trim().is_empty() {
        return Err(ApiError::validation("Full name is required"));
    }
    if payload.email.trim().is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let user_id = state
        .auth_service()
        .register(
            payload.full_name.trim(),
            payload.email.trim(),
            &payload.password,
            payload.phone.as_deref(),
        )
        .await?;

    Ok(Json(ApiResponse::success(
        "Registration successful",
        RegisterResponse { user_id },
    )))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    let result = state
        .auth_service()
        .login(&payload.email, &payload.password, client_info(&headers))
        .await?;

    session
        .insert(SESSION_TOKEN_KEY, &result.token)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(Json(ApiResponse::success(
        "Login successful",
        LoginResponse {
            role: result.role,
            token: result.token,
        },
    )))
}

/// POST /api/auth/logout
///
/// Idempotent: succeeds whether or not a session existed.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    session: Session,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if let Some(token) = extract_token(&session, &headers).await {
        state.auth_service().logout(&token).await?;
    }

    let _ = session.flush().await;

    Ok(Json(ApiResponse::success_empty("Logged out successfully")))
}
