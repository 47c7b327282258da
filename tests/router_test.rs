//! Routing, validation and auth-rejection tests
//!
//! These run against a pool that never connects: every request here is
//! expected to be rejected (or answered) before a query executes.

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::offline_server;

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let server = offline_server();
    let response = server.get("/api/nope").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn test_protected_route_without_token_is_unauthorized() {
    let server = offline_server();
    let response = server.get("/api/me").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn test_protected_route_with_garbage_token_is_unauthorized() {
    let server = offline_server();
    let response = server
        .get("/api/me")
        .add_header("authorization", "Bearer not-a-jwt")
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_route_without_token_is_unauthorized() {
    let server = offline_server();
    let response = server.get("/api/admin/users").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_send_code_requires_email() {
    let server = offline_server();
    let response = server
        .post("/api/auth/send-code")
        .json(&json!({"email": "   "}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Email required");
}

#[tokio::test]
async fn test_verify_code_requires_both_fields() {
    let server = offline_server();
    let response = server
        .post("/api/auth/verify-code")
        .json(&json!({"email": "a@b.com", "code": ""}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_requires_credentials() {
    let server = offline_server();
    let response = server
        .post("/api/auth/login")
        .json(&json!({"credential": "", "password": ""}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let server = offline_server();
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "email": "new@example.com",
            "username": "newuser",
            "password": "abc12345"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(
        body["error"].as_str().unwrap().contains("uppercase"),
        "unexpected error: {}",
        body["error"]
    );
}

#[tokio::test]
async fn test_register_rejects_bad_username() {
    let server = offline_server();
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "email": "new@example.com",
            "username": "x",
            "password": "Abc123!@"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reset_password_checks_strength_before_code() {
    // A weak password must not reach the store, let alone burn the code.
    let server = offline_server();
    let response = server
        .post("/api/auth/reset-password")
        .json(&json!({
            "email": "a@b.com",
            "code": "123456",
            "newPassword": "short"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
