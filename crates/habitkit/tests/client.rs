//! Integration tests for the full client stack: real `reqwest` transport,
//! real sockets, a local mock API server.
//!
//! Each test plays one session scenario end to end and checks both the
//! outcome the caller sees and the session state left behind.

use std::time::Duration;

use habitkit::prelude::*;
use habitkit::{HabitkitError, OutcomeError, NO_ACTIVE_SESSION};
use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

// =========================================================================
// Helpers
// =========================================================================

/// Starts a mock API mounted under `/dev`, like a staged gateway.
async fn start_api() -> (MockServer, AuthenticatedRequestClient) {
    let server = MockServer::start().await;
    let config = ClientConfig::builder()
        .base_url(format!("{}/dev/", server.uri()))
        .timeout(Duration::from_secs(5))
        .build()
        .expect("config should be valid");
    let client =
        AuthenticatedRequestClient::new(config).expect("client should build");
    (server, client)
}

async fn mount_login_token(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/dev/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "SUCCESS", "token": token })),
        )
        .mount(server)
        .await;
}

// =========================================================================
// Challenge flow
// =========================================================================

#[tokio::test]
async fn test_login_challenge_then_change_password_reaches_active() {
    let (server, client) = start_api().await;

    Mock::given(method("POST"))
        .and(path("/dev/login"))
        .and(body_json(json!({ "username": "a@x.com", "password": "pw1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ChallengeName": "NEW_PASSWORD_REQUIRED",
            "Session": "s1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/dev/change-password"))
        .and(body_json(json!({
            "username": "a@x.com",
            "session": "s1",
            "new_password": "NewPw1!"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": "tok123" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    // 1. Login returns a challenge.
    let outcome = client.login("a@x.com", "pw1").await;
    assert_eq!(
        outcome,
        ResponseOutcome::ChallengeRequired { session: "s1".into() }
    );
    assert!(!client.is_authenticated());
    assert!(client.session().needs_challenge_response());

    // 2. Password change completes sign-in.
    let outcome = client.change_password("a@x.com", "s1", "NewPw1!").await;
    assert!(outcome.is_success());
    assert!(client.is_authenticated());
    assert!(!client.session().needs_challenge_response());
    assert_eq!(client.session().credential().unwrap().as_str(), "tok123");
}

// =========================================================================
// Credential attachment and rejection
// =========================================================================

#[tokio::test]
async fn test_get_sends_bearer_and_403_clears_credential() {
    let (server, client) = start_api().await;
    mount_login_token(&server, "tok123").await;

    Mock::given(method("GET"))
        .and(path("/dev/habits"))
        .and(header("authorization", "Bearer tok123"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({ "message": "Forbidden" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    client.login("a@x.com", "pw1").await;
    assert!(client.is_authenticated());

    let outcome = client.get("habits").await;

    assert_eq!(outcome, ResponseOutcome::auth_error("Forbidden"));
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_post_without_session_makes_no_request() {
    let (server, client) = start_api().await;

    // Any request reaching the server would fail this expectation.
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut payload = Payload::new();
    payload.insert("name".into(), json!("read"));
    let outcome = client.post("habits", payload).await;

    assert_eq!(outcome, ResponseOutcome::auth_error(NO_ACTIVE_SESSION));
}

#[tokio::test]
async fn test_bootstrap_requests_carry_no_authorization() {
    let (server, client) = start_api().await;

    Mock::given(method("POST"))
        .and(path("/dev/register"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(400))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/dev/register"))
        .and(body_json(json!({ "email": "a@x.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "SUCCESS",
            "message": "temporary password sent"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client.register("a@x.com").await;

    assert_eq!(outcome.message(), Some("temporary password sent"));
    assert!(!client.is_authenticated());
}

// =========================================================================
// Transport failures
// =========================================================================

#[tokio::test]
async fn test_slow_server_times_out_without_touching_session() {
    let server = MockServer::start().await;
    let config = ClientConfig::builder()
        .base_url(server.uri())
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let client = AuthenticatedRequestClient::new(config).unwrap();
    client.session().set_active("tok123").unwrap();

    Mock::given(method("GET"))
        .and(path("/habits"))
        .respond_with(
            ResponseTemplate::new(200).set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let outcome = client.get("habits").await;

    assert!(
        matches!(outcome, ResponseOutcome::TransportError { .. }),
        "expected transport error, got {outcome:?}"
    );
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_unreachable_api_is_transport_error() {
    let config = ClientConfig::builder()
        .base_url("http://127.0.0.1:1/dev")
        .build()
        .unwrap();
    let client = AuthenticatedRequestClient::new(config).unwrap();

    let outcome = client.login("a@x.com", "pw1").await;

    assert!(matches!(outcome, ResponseOutcome::TransportError { .. }));
}

// =========================================================================
// Habits API
// =========================================================================

#[tokio::test]
async fn test_habits_crud_round_trip() {
    let (server, client) = start_api().await;
    mount_login_token(&server, "tok123").await;

    Mock::given(method("POST"))
        .and(path("/dev/habits"))
        .and(body_json(json!({
            "name": "read",
            "description": "20 pages",
            "frequency": "weekly"
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "habitId": "h1" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dev/habits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Items": [{
                "habit_id": "h1",
                "habit_name": "read",
                "description": "20 pages",
                "frequency": "weekly",
                "completed": false
            }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/dev/habits/h1/complete"))
        .and(body_json(json!({})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "completed": true })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/dev/habits/h1"))
        .and(body_json(json!({ "frequency": "daily" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dev/habits/h1/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "date": "2024-01-01" }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/dev/habits/h1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("deleted"))
        .expect(1)
        .mount(&server)
        .await;

    client.login("a@x.com", "pw1").await;
    let habits = client.habits();

    let new = NewHabit::new("read", Frequency::Weekly)
        .unwrap()
        .description("20 pages");
    let created = habits.create(&new).await.unwrap();
    assert_eq!(created["habitId"], "h1");

    let listed = habits.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "read");
    let id = listed[0].id.clone();

    habits.complete(&id).await.unwrap();

    let update = HabitUpdate {
        frequency: Some(Frequency::Daily),
        ..HabitUpdate::default()
    };
    habits.update(&id, &update).await.unwrap();

    let history = habits.history(&id).await.unwrap();
    assert_eq!(history["items"][0]["date"], "2024-01-01");

    let deleted = habits.delete(&id).await.unwrap();
    assert_eq!(deleted["message"], "deleted");
}

#[tokio::test]
async fn test_habits_list_without_session_is_auth_error() {
    let (_server, client) = start_api().await;

    let result = client.habits().list().await;

    assert!(matches!(
        result,
        Err(HabitkitError::Outcome(OutcomeError::Auth(_)))
    ));
}

#[tokio::test]
async fn test_habits_empty_update_is_rejected_locally() {
    let (server, client) = start_api().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    client.session().set_active("tok123").unwrap();

    let id = HabitId::new("h1").unwrap();
    let result = client.habits().update(&id, &HabitUpdate::default()).await;

    assert!(matches!(result, Err(HabitkitError::Protocol(_))));
}

#[tokio::test]
async fn test_server_error_message_reaches_caller() {
    let (server, client) = start_api().await;
    client.session().set_active("tok123").unwrap();

    Mock::given(method("DELETE"))
        .and(path("/dev/habits/h9"))
        .respond_with(|_: &Request| {
            ResponseTemplate::new(404)
                .set_body_json(json!({ "message": "habit not found" }))
        })
        .mount(&server)
        .await;

    let result = client.habits().delete(&HabitId::new("h9").unwrap()).await;

    match result {
        Err(HabitkitError::Outcome(OutcomeError::Server { status, message })) => {
            assert_eq!(status, 404);
            assert_eq!(message, "habit not found");
        }
        other => panic!("expected server error, got {other:?}"),
    }
    assert!(client.is_authenticated(), "404 must not clear the session");
}
