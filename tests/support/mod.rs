//! Shared test fixtures: an in-memory application and request helpers.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use blog_api::{AppConfig, AppState, Application, Environment, MemoryStore, Store};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        environment: Environment::Test,
        database_url: String::new(),
    }
}

pub fn test_state() -> AppState {
    AppState::new(test_config(), Arc::new(MemoryStore::new()))
}

/// The full application router over an in-memory store.
pub fn test_app(state: &AppState) -> Router {
    Application::build(state.clone())
        .expect("route table must bind")
        .router()
}

/// Send one request; returns status and parsed JSON body.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    user: Option<i64>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = user {
        builder = builder.header("x-user-id", id.to_string());
    }
    let request = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&v).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Insert a user directly through the store; returns its id.
pub async fn seed_user(state: &AppState, username: &str) -> i64 {
    let body = json!({
        "username": username,
        "email": format!("{username}@example.com"),
        "password": "not-a-real-password-digest"
    });
    let row = state
        .store
        .insert(&state.schema.users, body.as_object().unwrap())
        .await
        .unwrap();
    row["id"].as_i64().unwrap()
}

/// Insert a post directly through the store; returns its id.
pub async fn seed_post(state: &AppState, user_id: i64, text: &str) -> i64 {
    let body = json!({ "body": text, "user_id": user_id });
    let row = state
        .store
        .insert(&state.schema.posts, body.as_object().unwrap())
        .await
        .unwrap();
    row["id"].as_i64().unwrap()
}

/// Every response must be exactly one of the three envelopes:
/// success, not-found, or error.
pub fn assert_envelope(body: &Value) {
    let success = body.get("success");
    let error = body.get("error");
    match (success, error) {
        (Some(Value::Bool(true)), None) => {
            assert!(body.get("data").is_some(), "success envelope without data: {body}");
        }
        (Some(Value::Bool(false)), None) => {
            assert_eq!(body, &json!({ "success": false }), "malformed not-found envelope");
        }
        (None, Some(err)) => {
            assert!(err.get("code").is_some(), "error envelope without code: {body}");
            assert!(err.get("message").is_some(), "error envelope without message: {body}");
        }
        _ => panic!("body matches no known envelope: {body}"),
    }
}
