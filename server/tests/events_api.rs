//! HTTP-level tests for the event endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{event_body, TestApp, FUTURE, PAST};
use invitation_server::store::{AuthorityStore, EventStore};
use serde_json::json;
use tower::ServiceExt;

fn ids(json: &serde_json::Value) -> Vec<String> {
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["event_id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn create_returns_event_with_generated_id() {
    let app = TestApp::new().await;
    let (status, json) = app
        .request(Method::POST, "/api/events", Some("A"), Some(event_body(FUTURE)))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["type"], "wedding");
    assert_eq!(json["data"]["datetime"], FUTURE);
    let event_id = json["data"]["event_id"].as_str().unwrap();
    assert!(!event_id.is_empty());
    assert_eq!(app.store.list_managers(event_id).await.unwrap(), vec!["A"]);
}

#[tokio::test]
async fn requests_without_token_are_rejected() {
    let app = TestApp::new().await;
    let (status, json) = app
        .request(Method::GET, "/api/events/progressing", None, None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"]["code"], "AUTH_ERROR");
}

#[tokio::test]
async fn malformed_timestamp_is_rejected() {
    let app = TestApp::new().await;
    let (status, _) = app
        .request(
            Method::POST,
            "/api/events",
            Some("A"),
            Some(event_body("05/01/2099 6pm")),
        )
        .await;

    assert!(status.is_client_error());
}

#[tokio::test]
async fn missing_field_is_rejected() {
    let app = TestApp::new().await;
    let (status, _) = app
        .request(
            Method::POST,
            "/api/events",
            Some("A"),
            Some(json!({"type": "party", "datetime": FUTURE})),
        )
        .await;

    assert!(status.is_client_error());
}

#[tokio::test]
async fn progressing_and_done_lists_split_on_now() {
    let app = TestApp::new().await;
    let upcoming = app.create_event("A", FUTURE).await;
    let finished = app.create_event("A", PAST).await;
    app.create_event("B", FUTURE).await;

    let (_, progressing) = app.get("/api/events/progressing", "A").await;
    let (_, done) = app.get("/api/events/done", "A").await;

    assert_eq!(ids(&progressing), vec![upcoming]);
    assert_eq!(ids(&done), vec![finished]);
}

#[tokio::test]
async fn get_event_is_gated_by_authority() {
    let app = TestApp::new().await;
    let event_id = app.create_event("A", FUTURE).await;
    let uri = format!("/api/events/{}", event_id);

    let (status, json) = app.get(&uri, "A").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["event_id"], event_id.as_str());

    let (status, json) = app.get(&uri, "B").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn unauthorized_grant_reports_failure_and_changes_nothing() {
    let app = TestApp::new().await;
    let event_id = app.create_event("A", FUTURE).await;

    let (status, json) = app
        .request(
            Method::POST,
            &format!("/api/events/auth/{}", event_id),
            Some("B"),
            Some(json!({"uid": "C"})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert_eq!(app.store.list_managers(&event_id).await.unwrap(), vec!["A"]);
}

#[tokio::test]
async fn grant_to_unknown_member_is_not_found() {
    let app = TestApp::new().await;
    let event_id = app.create_event("A", FUTURE).await;

    let (status, _) = app
        .request(
            Method::POST,
            &format!("/api/events/auth/{}", event_id),
            Some("A"),
            Some(json!({"uid": "nobody"})),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_and_delete_require_authority() {
    let app = TestApp::new().await;
    let event_id = app.create_event("A", FUTURE).await;
    let uri = format!("/api/events/{}", event_id);

    let mut changed = event_body(PAST);
    changed["location"] = json!("Jeju");

    let (_, json) = app
        .request(Method::PUT, &uri, Some("B"), Some(changed.clone()))
        .await;
    assert_eq!(json["success"], false);

    let (status, json) = app
        .request(Method::PUT, &uri, Some("A"), Some(changed))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], event_id.as_str());
    let stored = app.store.find_event(&event_id).await.unwrap().unwrap();
    assert_eq!(stored.location, "Jeju");

    let (_, json) = app.request(Method::DELETE, &uri, Some("B"), None).await;
    assert_eq!(json["success"], false);
    assert!(app.store.find_event(&event_id).await.unwrap().is_some());

    let (status, json) = app.request(Method::DELETE, &uri, Some("A"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], event_id.as_str());
    assert!(app.store.find_event(&event_id).await.unwrap().is_none());
    assert!(app.store.list_managers(&event_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn shared_event_survives_until_last_manager_leaves() {
    let app = TestApp::new().await;
    let event_id = app.create_event("A", FUTURE).await;
    let auth_uri = format!("/api/events/auth/{}", event_id);
    let event_uri = format!("/api/events/{}", event_id);

    let (_, json) = app
        .request(Method::POST, &auth_uri, Some("A"), Some(json!({"uid": "B"})))
        .await;
    assert_eq!(json["success"], true);

    let (_, json) = app.get(&event_uri, "B").await;
    assert_eq!(json["success"], true);

    let (_, json) = app.request(Method::DELETE, &auth_uri, Some("B"), None).await;
    assert_eq!(json["data"]["event_id"], event_id.as_str());
    assert_eq!(json["data"]["event_deleted"], false);

    let (_, json) = app.get(&event_uri, "A").await;
    assert_eq!(json["success"], true);

    let (_, json) = app.request(Method::DELETE, &auth_uri, Some("A"), None).await;
    assert_eq!(json["data"]["event_deleted"], true);

    assert!(app.store.find_event(&event_id).await.unwrap().is_none());
    for member in ["A", "B"] {
        let (_, json) = app.get(&event_uri, member).await;
        assert_eq!(json["success"], false);
    }
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let app = TestApp::new().await;
    let response = app
        .router
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .uri("/health")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
    assert!(response.headers().get("strict-transport-security").is_none());
}
