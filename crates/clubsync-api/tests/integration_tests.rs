//! # Integration Tests for clubsync-api
//!
//! Drives the assembled router end to end: sign-up and sign-in, club
//! creation, the join-code workflow, role checks, hour review, the
//! dashboard, the event calendar, rate limiting and the snapshot backend.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use clubsync_api::state::{AppConfig, AppState};

fn test_app() -> Router {
    clubsync_api::app(AppState::new())
}

async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Send one request; the body is parsed as JSON when non-empty.
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let text = body_string(response).await;
    let value = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };
    (status, value)
}

/// Register and sign in; returns the session token.
async fn sign_up_and_in(app: &Router, email: &str, name: &str) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/v1/auth/sign-up",
        None,
        Some(json!({"email": email, "password": "correct horse", "display_name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(
        app,
        "POST",
        "/v1/auth/sign-in",
        None,
        Some(json!({"email": email, "password": "correct horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

/// Create a club; returns `(club_id, join_code, officer_member_id)`.
async fn create_club(app: &Router, token: &str, name: &str) -> (String, String, String) {
    let (status, body) = send(
        app,
        "POST",
        "/v1/clubs",
        Some(token),
        Some(json!({"name": name, "hour_goal": 100.0})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    (
        body["club"]["id"].as_str().unwrap().to_string(),
        body["club"]["join_code"].as_str().unwrap().to_string(),
        body["member_id"].as_str().unwrap().to_string(),
    )
}

/// Bob asks to join Alice's club and Alice approves; returns Bob's member id.
async fn admit(app: &Router, officer: &str, joiner: &str, club_id: &str, code: &str) -> String {
    let (status, request) = send(
        app,
        "POST",
        "/v1/join-requests",
        Some(joiner),
        Some(json!({"join_code": code.to_lowercase()})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let request_id = request["id"].as_str().unwrap();
    let (status, _) = send(
        app,
        "POST",
        &format!("/v1/clubs/{club_id}/join-requests/{request_id}/approve"),
        Some(officer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, session) = send(app, "GET", "/v1/auth/session", Some(joiner), None).await;
    session["clubs"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["club"]["id"] == club_id)
        .map(|m| m["member_id"].as_str().unwrap().to_string())
        .unwrap()
}

// -- Health & docs ------------------------------------------------------------

#[tokio::test]
async fn test_health_probes() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/health/liveness", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".into()));
    let (status, body) = send(&app, "GET", "/health/readiness", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ready".into()));
}

#[tokio::test]
async fn test_openapi_served_without_auth() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/v1/clubs"].is_object());
}

// -- Authentication -----------------------------------------------------------

#[tokio::test]
async fn test_protected_routes_require_session() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/v1/clubs", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, _) = send(&app, "GET", "/v1/clubs", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sign_up_duplicate_and_bad_password() {
    let app = test_app();
    let token = sign_up_and_in(&app, "alice@school.edu", "Alice").await;
    assert!(!token.is_empty());

    let (status, _) = send(
        &app,
        "POST",
        "/v1/auth/sign-up",
        None,
        Some(json!({"email": "ALICE@school.edu", "password": "another pass", "display_name": "A"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        "POST",
        "/v1/auth/sign-in",
        None,
        Some(json!({"email": "alice@school.edu", "password": "wrong password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "invalid email or password");
}

#[tokio::test]
async fn test_sign_in_failures_look_alike() {
    let app = test_app();
    sign_up_and_in(&app, "alice@school.edu", "Alice").await;

    let (wrong_status, wrong) = send(
        &app,
        "POST",
        "/v1/auth/sign-in",
        None,
        Some(json!({"email": "alice@school.edu", "password": "wrong password"})),
    )
    .await;
    let (unknown_status, unknown) = send(
        &app,
        "POST",
        "/v1/auth/sign-in",
        None,
        Some(json!({"email": "nobody@school.edu", "password": "wrong password"})),
    )
    .await;
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong["error"], unknown["error"]);
}

#[tokio::test]
async fn test_oversized_password_is_refused_before_hashing() {
    let app = test_app();
    let huge = "x".repeat(1_000_000);
    let started = std::time::Instant::now();
    let (status, body) = send(
        &app,
        "POST",
        "/v1/auth/sign-in",
        None,
        Some(json!({"email": "nobody@school.edu", "password": huge})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "invalid email or password");
    assert!(
        started.elapsed() < std::time::Duration::from_secs(2),
        "took {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn test_sign_out_revokes_token() {
    let app = test_app();
    let token = sign_up_and_in(&app, "alice@school.edu", "Alice").await;
    let (status, _) = send(&app, "POST", "/v1/auth/sign-out", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", "/v1/auth/session", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = test_app();
    let token = sign_up_and_in(&app, "alice@school.edu", "Alice").await;
    let request = Request::builder()
        .method("POST")
        .uri("/v1/clubs")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

// -- Clubs & join workflow ----------------------------------------------------

#[tokio::test]
async fn test_join_code_workflow() {
    let app = test_app();
    let alice = sign_up_and_in(&app, "alice@school.edu", "Alice").await;
    let bob = sign_up_and_in(&app, "bob@school.edu", "Bob").await;
    let (club_id, code, _) = create_club(&app, &alice, "Robotics").await;
    assert_eq!(code.len(), 8);

    // Not yet a member: the club is invisible.
    let (status, _) = send(&app, "GET", &format!("/v1/clubs/{club_id}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/v1/join-requests",
        Some(&bob),
        Some(json!({"join_code": "ZZZZZZZZ"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, request) = send(
        &app,
        "POST",
        "/v1/join-requests",
        Some(&bob),
        Some(json!({"join_code": code.to_lowercase(), "message": "I build robots"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["status"], "pending");

    let (status, _) = send(
        &app,
        "POST",
        "/v1/join-requests",
        Some(&bob),
        Some(json!({"join_code": code})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Bob cannot approve his own request.
    let request_id = request["id"].as_str().unwrap();
    let approve = format!("/v1/clubs/{club_id}/join-requests/{request_id}/approve");
    let (status, _) = send(&app, "POST", &approve, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, decided) = send(&app, "POST", &approve, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decided["status"], "approved");

    let (status, _) = send(&app, "POST", &approve, Some(&alice), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, club) = send(&app, "GET", &format!("/v1/clubs/{club_id}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(club["role"], "member");

    let (_, roster) = send(
        &app,
        "GET",
        &format!("/v1/clubs/{club_id}/members"),
        Some(&alice),
        None,
    )
    .await;
    let names: Vec<&str> = roster
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alice", "Bob"]);
}

#[tokio::test]
async fn test_rotating_join_code_retires_the_old_one() {
    let app = test_app();
    let alice = sign_up_and_in(&app, "alice@school.edu", "Alice").await;
    let bob = sign_up_and_in(&app, "bob@school.edu", "Bob").await;
    let cara = sign_up_and_in(&app, "cara@school.edu", "Cara").await;
    let (club_id, old_code, _) = create_club(&app, &alice, "Debate").await;
    admit(&app, &alice, &bob, &club_id, &old_code).await;

    let rotate = format!("/v1/clubs/{club_id}/join-code/rotate");
    let (status, _) = send(&app, "POST", &rotate, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, club) = send(&app, "POST", &rotate, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let new_code = club["join_code"].as_str().unwrap().to_string();
    assert_eq!(new_code.len(), 8);
    assert_ne!(new_code, old_code);

    let (status, _) = send(
        &app,
        "POST",
        "/v1/join-requests",
        Some(&cara),
        Some(json!({"join_code": old_code})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, request) = send(
        &app,
        "POST",
        "/v1/join-requests",
        Some(&cara),
        Some(json!({"join_code": new_code})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["club_id"], club_id.as_str());
}

#[tokio::test]
async fn test_member_cannot_write_officer_data() {
    let app = test_app();
    let alice = sign_up_and_in(&app, "alice@school.edu", "Alice").await;
    let bob = sign_up_and_in(&app, "bob@school.edu", "Bob").await;
    let (club_id, code, _) = create_club(&app, &alice, "Debate").await;
    admit(&app, &alice, &bob, &club_id, &code).await;

    let note = json!({"title": "Kickoff", "meeting_date": "2024-09-05", "content": "Agenda"});
    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/clubs/{club_id}/notes"),
        Some(&bob),
        Some(note.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let (status, created) = send(
        &app,
        "POST",
        &format!("/v1/clubs/{club_id}/notes"),
        Some(&alice),
        Some(note),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["author"], "Alice");

    // Members may read.
    let (status, notes) = send(
        &app,
        "GET",
        &format!("/v1/clubs/{club_id}/notes?query=agenda"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notes.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_last_officer_is_protected() {
    let app = test_app();
    let alice = sign_up_and_in(&app, "alice@school.edu", "Alice").await;
    let (club_id, _, alice_member) = create_club(&app, &alice, "Chess").await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/v1/clubs/{club_id}/members/{alice_member}"),
        Some(&alice),
        Some(json!({"name": "Alice", "role": "member"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/v1/clubs/{club_id}/members/{alice_member}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_club_removes_it_for_members() {
    let app = test_app();
    let alice = sign_up_and_in(&app, "alice@school.edu", "Alice").await;
    let (club_id, _, _) = create_club(&app, &alice, "Drama").await;
    let (status, _) = send(&app, "DELETE", &format!("/v1/clubs/{club_id}"), Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, clubs) = send(&app, "GET", "/v1/clubs", Some(&alice), None).await;
    assert!(clubs.as_array().unwrap().is_empty());
}

// -- Hours, attendance, tasks, dashboard --------------------------------------

#[tokio::test]
async fn test_hour_review_and_dashboard() {
    let app = test_app();
    let alice = sign_up_and_in(&app, "alice@school.edu", "Alice").await;
    let bob = sign_up_and_in(&app, "bob@school.edu", "Bob").await;
    let (club_id, code, _) = create_club(&app, &alice, "Key Club").await;
    let bob_member = admit(&app, &alice, &bob, &club_id, &code).await;

    let (status, entry) = send(
        &app,
        "POST",
        &format!("/v1/clubs/{club_id}/hours"),
        Some(&bob),
        Some(json!({"date": "2024-10-05", "hours": 4.0, "activity": "Food bank"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["member_id"], bob_member.as_str());
    assert_eq!(entry["status"], "pending");
    let entry_id = entry["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/clubs/{club_id}/hours/{entry_id}/approve"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, approved) = send(
        &app,
        "POST",
        &format!("/v1/clubs/{club_id}/hours/{entry_id}/approve"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");

    // Approved entries are locked for the submitter.
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/v1/clubs/{club_id}/hours/{entry_id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, board) = send(
        &app,
        "GET",
        &format!("/v1/clubs/{club_id}/hours/leaderboard?limit=5"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["leaders"][0]["name"], "Bob");
    assert_eq!(board["total_hours"], 4.0);

    let (status, summary) = send(
        &app,
        "GET",
        &format!("/v1/clubs/{club_id}/dashboard"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_approved_hours"], 4.0);
    assert_eq!(summary["members"]["total"], 2);
    assert_eq!(summary["members"]["officers"], 1);
}

#[tokio::test]
async fn test_attendance_batch_and_stats() {
    let app = test_app();
    let alice = sign_up_and_in(&app, "alice@school.edu", "Alice").await;
    let bob = sign_up_and_in(&app, "bob@school.edu", "Bob").await;
    let (club_id, code, alice_member) = create_club(&app, &alice, "Band").await;
    let bob_member = admit(&app, &alice, &bob, &club_id, &code).await;

    let uri = format!("/v1/clubs/{club_id}/attendance/batch");
    let roll = json!({
        "date": "2024-10-01",
        "entries": [
            {"member_id": alice_member, "status": "present"},
            {"member_id": bob_member, "status": "absent"},
        ]
    });
    let (status, written) = send(&app, "POST", &uri, Some(&alice), Some(roll)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(written.as_array().unwrap().len(), 2);

    // Re-taking roll overwrites instead of duplicating.
    let fix = json!({"date": "2024-10-01", "entries": [{"member_id": bob_member, "status": "late"}]});
    let (status, _) = send(&app, "POST", &uri, Some(&alice), Some(fix)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/clubs/{club_id}/attendance"),
        Some(&alice),
        Some(json!({"member_id": bob_member, "date": "2024-10-01", "status": "present"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, stats) = send(
        &app,
        "GET",
        &format!("/v1/clubs/{club_id}/attendance/stats"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["meetings"], 1);
    assert_eq!(stats["rate"], 100.0);
}

#[tokio::test]
async fn test_assignee_moves_task() {
    let app = test_app();
    let alice = sign_up_and_in(&app, "alice@school.edu", "Alice").await;
    let bob = sign_up_and_in(&app, "bob@school.edu", "Bob").await;
    let (club_id, code, _) = create_club(&app, &alice, "Yearbook").await;
    let bob_member = admit(&app, &alice, &bob, &club_id, &code).await;

    let (status, task) = send(
        &app,
        "POST",
        &format!("/v1/clubs/{club_id}/tasks"),
        Some(&alice),
        Some(json!({"title": "Collect photos", "assignee_id": bob_member, "priority": "high"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["status"], "todo");
    let task_id = task["id"].as_str().unwrap();
    let status_uri = format!("/v1/clubs/{club_id}/tasks/{task_id}/status");

    let (status, done) = send(&app, "PUT", &status_uri, Some(&bob), Some(json!({"status": "done"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(done["completed_at"].is_string());

    let (status, _) = send(&app, "PUT", &status_uri, Some(&bob), Some(json!({"status": "todo"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_event_windows() {
    let app = test_app();
    let alice = sign_up_and_in(&app, "alice@school.edu", "Alice").await;
    let (club_id, _, _) = create_club(&app, &alice, "Drama").await;
    let now = chrono::Utc::now();
    let at = |hours: i64| (now + chrono::Duration::hours(hours)).to_rfc3339();

    let events_uri = format!("/v1/clubs/{club_id}/events");
    for (title, start, end) in [
        ("Auditions", at(-48), Some(at(-46))),
        ("Rehearsal", at(-3), Some(at(2))),
        ("Opening night", at(72), None),
        ("Cast party", at(-1), None),
    ] {
        let (status, _) = send(
            &app,
            "POST",
            &events_uri,
            Some(&alice),
            Some(json!({"title": title, "starts_at": start, "ends_at": end})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let titles = |body: &Value| -> Vec<String> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|e| e["title"].as_str().unwrap().to_string())
            .collect()
    };

    let (status, upcoming) =
        send(&app, "GET", &format!("{events_uri}?window=upcoming"), Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&upcoming), ["Rehearsal", "Opening night"]);

    let (_, past) = send(&app, "GET", &format!("{events_uri}?window=past"), Some(&alice), None).await;
    assert_eq!(titles(&past), ["Cast party", "Auditions"]);

    let (_, all) = send(&app, "GET", &events_uri, Some(&alice), None).await;
    assert_eq!(all.as_array().unwrap().len(), 4);

    let (status, _) =
        send(&app, "GET", &format!("{events_uri}?window=someday"), Some(&alice), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// -- Ambient ------------------------------------------------------------------

#[tokio::test]
async fn test_rate_limit_applies_to_anonymous_routes() {
    let config = AppConfig {
        rate_limit_per_minute: 2,
        ..AppConfig::default()
    };
    let app = clubsync_api::app(AppState::with_config(config, None));
    let sign_in = json!({"email": "nobody@school.edu", "password": "whatever1"});
    for _ in 0..2 {
        let (status, _) = send(&app, "POST", "/v1/auth/sign-in", None, Some(sign_in.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let (status, body) = send(&app, "POST", "/v1/auth/sign-in", None, Some(sign_in)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "RATE_LIMITED");
    assert!(body["error"]["details"]["retry_after_secs"].as_u64().unwrap() >= 1);

    let (_, metrics) = send(&app, "GET", "/metrics", None, None).await;
    assert_eq!(metrics["rate_limited"], 1);
}

#[tokio::test]
async fn test_rejected_tokens_count_against_anonymous_window() {
    let config = AppConfig {
        rate_limit_per_minute: 2,
        ..AppConfig::default()
    };
    let app = clubsync_api::app(AppState::with_config(config, None));
    for _ in 0..2 {
        let (status, _) = send(&app, "GET", "/v1/clubs", Some("guess.deadbeef"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let (status, body) = send(&app, "GET", "/v1/clubs", Some("guess.deadbeef"), None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "RATE_LIMITED");

    // Same window as the public routes.
    let (status, _) = send(
        &app,
        "POST",
        "/v1/auth/sign-in",
        None,
        Some(json!({"email": "nobody@school.edu", "password": "whatever1"})),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_metrics_can_be_disabled() {
    let config = AppConfig {
        metrics_enabled: false,
        ..AppConfig::default()
    };
    let app = clubsync_api::app(AppState::with_config(config, None));
    let (status, _) = send(&app, "GET", "/metrics", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_snapshot_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clubsync.json");
    let config = AppConfig {
        snapshot_path: Some(path.clone()),
        ..AppConfig::default()
    };

    let app = clubsync_api::app(AppState::with_config(config.clone(), None));
    let alice = sign_up_and_in(&app, "alice@school.edu", "Alice").await;
    let (club_id, _, _) = create_club(&app, &alice, "Garden").await;
    assert!(path.exists());

    // Sessions are not persisted, so sign in again after the restart.
    let restarted = AppState::with_config(config, None);
    restarted.hydrate().await.unwrap();
    let app = clubsync_api::app(restarted);
    let (status, _) = send(&app, "GET", "/v1/clubs", Some(&alice), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        "POST",
        "/v1/auth/sign-in",
        None,
        Some(json!({"email": "alice@school.edu", "password": "correct horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap();
    let (status, club) = send(&app, "GET", &format!("/v1/clubs/{club_id}"), Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(club["club"]["name"], "Garden");
}
