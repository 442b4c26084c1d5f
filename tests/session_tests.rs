use std::sync::Arc;

use chrono::{Duration, Utc};
use complainr::config::Config;
use complainr::db::generate_session_token;
use complainr::scheduler::Scheduler;
use complainr::services::AuthError;
use complainr::state::SharedState;
use sea_orm::EntityTrait;

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_url = "sqlite::memory:".to_string();
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.classifier.url = "http://127.0.0.1:9".to_string();
    config.classifier.timeout_seconds = 1;
    config
}

async fn spawn_state() -> Arc<SharedState> {
    Arc::new(
        SharedState::new(test_config())
            .await
            .expect("Failed to build state"),
    )
}

#[tokio::test]
async fn expired_sessions_are_rejected_and_removed() {
    let state = spawn_state().await;

    // Seeded admin is user 1; hand-plant a session already past expiry.
    let token = generate_session_token();
    let expired = (Utc::now() - Duration::hours(2)).to_rfc3339();
    state
        .store
        .replace_session(1, &token, &expired, None, None)
        .await
        .unwrap();

    let err = state.auth_service.authenticate(&token).await.unwrap_err();
    assert!(matches!(err, AuthError::SessionExpired));
    assert_eq!(err.to_string(), "Session expired, please log in again");

    // The stale row was deleted on sight
    assert!(
        state
            .store
            .get_session_by_token(&token)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn authentication_slides_the_expiry_window() {
    let state = spawn_state().await;

    let token = generate_session_token();
    let near_expiry = (Utc::now() + Duration::seconds(30)).to_rfc3339();
    state
        .store
        .replace_session(1, &token, &near_expiry, None, None)
        .await
        .unwrap();

    let user = state.auth_service.authenticate(&token).await.unwrap();
    assert_eq!(user.id, 1);
    assert!(user.is_admin());

    let session = state
        .store
        .get_session_by_token(&token)
        .await
        .unwrap()
        .unwrap();
    assert!(session.expires_at > near_expiry);
}

#[tokio::test]
async fn sweep_removes_only_expired_sessions() {
    let state = spawn_state().await;

    // One live session for the admin, one expired for a second user.
    let second_user = state
        .auth_service
        .register("Bruno Silva", "bruno@example.com", "sturdy-password", None)
        .await
        .unwrap();

    let live_token = generate_session_token();
    let live = (Utc::now() + Duration::hours(1)).to_rfc3339();
    state
        .store
        .replace_session(1, &live_token, &live, None, None)
        .await
        .unwrap();

    let dead_token = generate_session_token();
    let dead = (Utc::now() - Duration::minutes(5)).to_rfc3339();
    state
        .store
        .replace_session(second_user, &dead_token, &dead, None, None)
        .await
        .unwrap();

    let swept = Scheduler::new(state.clone()).run_once().await.unwrap();
    assert_eq!(swept, 1);

    assert!(
        state
            .store
            .get_session_by_token(&live_token)
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        state
            .store
            .get_session_by_token(&dead_token)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn submission_records_a_prediction_log_entry() {
    let state = spawn_state().await;

    let receipt = state
        .complaint_service
        .submit(1, "water leakage near block B")
        .await
        .unwrap();

    let entries = complainr::entities::prediction_log::Entity::find()
        .all(&state.store.conn)
        .await
        .unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].complaint_id, receipt.complaint_id);
    // Classifier unreachable: default prediction is logged
    assert_eq!(entries[0].predicted_priority, "Low");
    assert!((entries[0].confidence_score - 0.0).abs() < f64::EPSILON);
    assert_eq!(entries[0].model_version, "v1.0");
}

#[tokio::test]
async fn permissive_state_machine_allows_any_transition() {
    let state = spawn_state().await;

    let receipt = state
        .complaint_service
        .submit(1, "pothole on main street")
        .await
        .unwrap();
    let id = receipt.complaint_id;

    // Walk backwards through the lifecycle: no transition is illegal.
    for status in ["Resolved", "In Progress", "Registered"] {
        state
            .complaint_service
            .update_status(id, status, 1, None)
            .await
            .unwrap();
    }

    let details = state.complaint_service.get_details(id).await.unwrap();
    assert_eq!(details.complaint.status, "Registered");
    assert_eq!(details.history.len(), 3);

    // The current status always matches the newest history entry
    assert_eq!(
        details.history.last().unwrap().new_status,
        details.complaint.status
    );
    assert_eq!(details.history[0].old_status.as_deref(), Some("Registered"));
    assert_eq!(details.history[1].old_status.as_deref(), Some("Resolved"));
}
