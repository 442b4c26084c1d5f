use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use complainr::config::Config;
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Seeded admin credentials (must match the initial migration)
const ADMIN_EMAIL: &str = "admin@complaint.com";
const ADMIN_PASSWORD: &str = "changeme!";

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_url = "sqlite::memory:".to_string();
    // A single pooled connection so the in-memory database is shared.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    // Nothing listens here: every classification falls back to Low.
    config.classifier.url = "http://127.0.0.1:9".to_string();
    config.classifier.timeout_seconds = 1;
    config.server.secure_cookies = false;
    config
}

async fn spawn_app() -> Router {
    let state = complainr::api::create_app_state_from_config(test_config(), None)
        .await
        .expect("Failed to create app state");
    complainr::api::router(state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn post_json(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    payload: &serde_json::Value,
) -> axum::response::Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("X-Session-Token", token);
    }
    app.clone()
        .oneshot(
            builder
                .body(Body::from(serde_json::to_string(payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn get(app: &Router, uri: &str, token: Option<&str>) -> axum::response::Response {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("X-Session-Token", token);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn register_user(app: &Router, name: &str, email: &str, password: &str) -> i64 {
    let response = post_json(
        app,
        "/api/auth/register",
        None,
        &serde_json::json!({"fullName": name, "email": email, "password": password}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["data"]["userId"].as_i64().unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = post_json(
        app,
        "/api/auth/login",
        None,
        &serde_json::json!({"email": email, "password": password}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_registration_validation() {
    let app = spawn_app().await;

    register_user(&app, "Asha Rao", "asha@example.com", "sturdy-password").await;

    // Same email a second time
    let response = post_json(
        &app,
        "/api/auth/register",
        None,
        &serde_json::json!({
            "fullName": "Asha Again",
            "email": "asha@example.com",
            "password": "another-password"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Email already registered");

    // Password under 8 characters
    let response = post_json(
        &app,
        "/api/auth/register",
        None,
        &serde_json::json!({
            "fullName": "Short Pass",
            "email": "short@example.com",
            "password": "seven77"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "Password must be at least 8 characters"
    );

    // Malformed email
    let response = post_json(
        &app,
        "/api/auth/register",
        None,
        &serde_json::json!({
            "fullName": "Bad Email",
            "email": "not-an-email",
            "password": "long-enough"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid email format");
}

#[tokio::test]
async fn test_login_does_not_leak_account_existence() {
    let app = spawn_app().await;

    register_user(&app, "Asha Rao", "asha@example.com", "sturdy-password").await;

    let wrong_password = post_json(
        &app,
        "/api/auth/login",
        None,
        &serde_json::json!({"email": "asha@example.com", "password": "wrong-password"}),
    )
    .await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);

    let unknown_email = post_json(
        &app,
        "/api/auth/login",
        None,
        &serde_json::json!({"email": "ghost@example.com", "password": "whatever-pass"}),
    )
    .await;
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    // Identical message either way
    let a = body_json(wrong_password).await;
    let b = body_json(unknown_email).await;
    assert_eq!(a["message"], b["message"]);
    assert_eq!(a["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_complaints_require_authentication() {
    let app = spawn_app().await;

    let response = get(&app, "/api/complaints", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get(&app, "/api/complaints", Some("bogus-token")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_submit_complaint_with_unreachable_classifier() {
    let app = spawn_app().await;

    register_user(&app, "Asha Rao", "asha@example.com", "sturdy-password").await;
    let token = login(&app, "asha@example.com", "sturdy-password").await;

    // Empty and whitespace-only text are rejected
    for text in ["", "   "] {
        let response = post_json(
            &app,
            "/api/complaints",
            Some(&token),
            &serde_json::json!({"complaint_text": text}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // The classifier endpoint is unreachable, so submission still
    // succeeds with the default Low priority.
    let response = post_json(
        &app,
        "/api/complaints",
        Some(&token),
        &serde_json::json!({"complaint_text": "water leakage near block B"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["data"]["complaintId"].as_i64().unwrap() > 0);
    assert_eq!(body["data"]["priority"], "Low");

    let response = get(&app, "/api/complaints", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(
        body["data"]["complaints"][0]["complaint_text"],
        "water leakage near block B"
    );
    assert_eq!(body["data"]["complaints"][0]["status"], "Registered");
}

#[tokio::test]
async fn test_pagination_splits_at_page_size() {
    let app = spawn_app().await;

    register_user(&app, "Asha Rao", "asha@example.com", "sturdy-password").await;
    let token = login(&app, "asha@example.com", "sturdy-password").await;

    for i in 0..25 {
        let response = post_json(
            &app,
            "/api/complaints",
            Some(&token),
            &serde_json::json!({"complaint_text": format!("streetlight {i} is out")}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = get(&app, "/api/complaints?page=2", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["total"], 25);
    assert_eq!(body["data"]["pages"], 2);
    assert_eq!(body["data"]["page"], 2);
    assert_eq!(body["data"]["complaints"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_admin_routes_reject_regular_users() {
    let app = spawn_app().await;

    register_user(&app, "Asha Rao", "asha@example.com", "sturdy-password").await;
    let token = login(&app, "asha@example.com", "sturdy-password").await;

    for uri in [
        "/api/admin/complaints",
        "/api/admin/stats",
        "/api/metrics",
    ] {
        let response = get(&app, uri, Some(&token)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let response = get(&app, "/api/admin/stats", Some(&admin_token)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_status_update_appends_history() {
    let app = spawn_app().await;

    register_user(&app, "Asha Rao", "asha@example.com", "sturdy-password").await;
    let token = login(&app, "asha@example.com", "sturdy-password").await;
    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = post_json(
        &app,
        "/api/complaints",
        Some(&token),
        &serde_json::json!({"complaint_text": "garbage not collected for a week"}),
    )
    .await;
    let complaint_id = body_json(response).await["data"]["complaintId"]
        .as_i64()
        .unwrap();

    // Unknown complaint id
    let response = post_json(
        &app,
        "/api/admin/complaints/status",
        Some(&admin_token),
        &serde_json::json!({"complaintId": 99_999, "newStatus": "Resolved"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Unknown status label
    let response = post_json(
        &app,
        "/api/admin/complaints/status",
        Some(&admin_token),
        &serde_json::json!({"complaintId": complaint_id, "newStatus": "Closed"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // First real transition
    let response = post_json(
        &app,
        "/api/admin/complaints/status",
        Some(&admin_token),
        &serde_json::json!({
            "complaintId": complaint_id,
            "newStatus": "Under Review",
            "notes": "assigned to sanitation team"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(
        &app,
        &format!("/api/admin/complaints/{complaint_id}"),
        Some(&admin_token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let history = body["data"]["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["old_status"], "Registered");
    assert_eq!(history[0]["new_status"], "Under Review");
    assert_eq!(history[0]["notes"], "assigned to sanitation team");
    assert_eq!(body["data"]["status"], "Under Review");
    assert!(body["data"]["resolved_at"].is_null());

    // Resolving stamps resolved_at and appends exactly one more entry
    let response = post_json(
        &app,
        "/api/admin/complaints/status",
        Some(&admin_token),
        &serde_json::json!({"complaintId": complaint_id, "newStatus": "Resolved"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(
        &app,
        &format!("/api/admin/complaints/{complaint_id}"),
        Some(&admin_token),
    )
    .await;
    let body = body_json(response).await;
    let history = body["data"]["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1]["old_status"], "Under Review");
    assert_eq!(history[1]["new_status"], "Resolved");
    assert_eq!(body["data"]["status"], "Resolved");
    assert!(body["data"]["resolved_at"].is_string());
}

#[tokio::test]
async fn test_admin_list_filters_and_search() {
    let app = spawn_app().await;

    register_user(&app, "Asha Rao", "asha@example.com", "sturdy-password").await;
    register_user(&app, "Bruno Silva", "bruno@example.com", "sturdy-password").await;
    let asha = login(&app, "asha@example.com", "sturdy-password").await;
    let bruno = login(&app, "bruno@example.com", "sturdy-password").await;
    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    post_json(
        &app,
        "/api/complaints",
        Some(&asha),
        &serde_json::json!({"complaint_text": "water leakage near block B"}),
    )
    .await;
    post_json(
        &app,
        "/api/complaints",
        Some(&bruno),
        &serde_json::json!({"complaint_text": "broken elevator in tower 3"}),
    )
    .await;

    // No filters: everything, with submitter details joined in
    let response = get(&app, "/api/admin/complaints", Some(&admin_token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["total"], 2);
    assert!(
        body["data"]["complaints"][0]["full_name"].is_string(),
        "admin rows carry the submitter"
    );

    // Substring search across complaint text
    let response = get(
        &app,
        "/api/admin/complaints?search=elevator",
        Some(&admin_token),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["complaints"][0]["email"], "bruno@example.com");

    // Search also matches submitter name, case-insensitively
    let response = get(&app, "/api/admin/complaints?search=asha", Some(&admin_token)).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["complaints"][0]["email"], "asha@example.com");

    // Status equality filter
    let response = get(
        &app,
        "/api/admin/complaints?status=Resolved",
        Some(&admin_token),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["total"], 0);

    // Unknown filter values are a client error, not an empty result
    let response = get(
        &app,
        "/api/admin/complaints?priority=Urgent",
        Some(&admin_token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_statistics_counts_by_status() {
    let app = spawn_app().await;

    register_user(&app, "Asha Rao", "asha@example.com", "sturdy-password").await;
    let token = login(&app, "asha@example.com", "sturdy-password").await;
    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let mut ids = Vec::new();
    for text in ["first issue", "second issue", "third issue"] {
        let response = post_json(
            &app,
            "/api/complaints",
            Some(&token),
            &serde_json::json!({"complaint_text": text}),
        )
        .await;
        ids.push(
            body_json(response).await["data"]["complaintId"]
                .as_i64()
                .unwrap(),
        );
    }

    for id in &ids[1..] {
        let response = post_json(
            &app,
            "/api/admin/complaints/status",
            Some(&admin_token),
            &serde_json::json!({"complaintId": id, "newStatus": "Resolved"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = get(&app, "/api/admin/stats", Some(&admin_token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["total_complaints"], 3);
    assert_eq!(body["data"]["registered"], 1);
    assert_eq!(body["data"]["resolved"], 2);
    assert_eq!(body["data"]["under_review"], 0);
    // Classifier is unreachable in tests, so everything lands on Low
    assert_eq!(body["data"]["low_priority"], 3);
    assert_eq!(body["data"]["recent"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_logout_invalidates_the_session() {
    let app = spawn_app().await;

    register_user(&app, "Asha Rao", "asha@example.com", "sturdy-password").await;
    let token = login(&app, "asha@example.com", "sturdy-password").await;

    let response = get(&app, "/api/complaints", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        &app,
        "/api/auth/logout",
        Some(&token),
        &serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, "/api/complaints", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Logging out twice is fine
    let response = post_json(
        &app,
        "/api/auth/logout",
        Some(&token),
        &serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_second_login_replaces_first_session() {
    let app = spawn_app().await;

    register_user(&app, "Asha Rao", "asha@example.com", "sturdy-password").await;
    let first = login(&app, "asha@example.com", "sturdy-password").await;
    let second = login(&app, "asha@example.com", "sturdy-password").await;

    assert_ne!(first, second);

    let response = get(&app, "/api/complaints", Some(&second)).await;
    assert_eq!(response.status(), StatusCode::OK);

    // One session per user: the earlier token no longer works
    let response = get(&app, "/api/complaints", Some(&first)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = spawn_app().await;

    let response = get(&app, "/api/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["database"], true);
    // The fake classifier endpoint is down, reported but not fatal
    assert_eq!(body["data"]["classifier"], false);
    assert_eq!(body["data"]["status"], "healthy");
}
