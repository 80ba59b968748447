//! Shared helpers for driving the router in-process.

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use validationd::{create_app, AppState, AuthTokens, SeedData, Stores};

pub const TOKEN: &str = "test-token";

pub fn seed_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/seed.json")
}

/// Router over fresh in-memory stores loaded with the fixture dataset.
pub async fn seeded_app() -> Router {
    let stores = Stores::in_memory();
    SeedData::load(&seed_path())
        .expect("fixture parses")
        .apply(&stores)
        .await
        .expect("fixture loads");
    create_app(
        AppState::new(&stores, AuthTokens::new([TOKEN])),
        Duration::from_secs(5),
    )
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, Some(TOKEN), None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(TOKEN), Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, Some(TOKEN), None).await
}

/// Shape checks every returned result must pass.
pub fn check_validation_result(result: &Value) {
    chrono::DateTime::parse_from_rfc3339(result["timestamp"].as_str().unwrap()).unwrap();
    uuid::Uuid::parse_str(result["id"].as_str().unwrap()).unwrap();
    uuid::Uuid::parse_str(result["model_version_id"].as_str().unwrap()).unwrap();
    uuid::Uuid::parse_str(result["test_code_id"].as_str().unwrap()).unwrap();
    for item in result["results_storage"].as_array().unwrap() {
        url_has_host(item.as_str().unwrap());
    }
    assert!(result["score"].is_f64(), "score should be a float: {result}");
    let normalized = &result["normalized_score"];
    assert!(normalized.is_null() || normalized.is_f64());
    let passed = &result["passed"];
    assert!(passed.is_null() || passed.is_boolean());
}

fn url_has_host(raw: &str) {
    let (scheme, rest) = raw.split_once("://").expect("absolute URL");
    assert!(!scheme.is_empty());
    assert!(!rest.split('/').next().unwrap_or_default().is_empty());
}

pub fn ids(values: &Value) -> Vec<String> {
    values
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap().to_string())
        .collect()
}
