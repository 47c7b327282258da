//! End-to-end API flows against a real database
//!
//! Run with a disposable database:
//!
//! ```text
//! DATABASE_URL=postgres://localhost/recipeshare_test cargo test -- --ignored
//! ```

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};
use serial_test::serial;

use common::{db_server, pending_code, seed_dish};

async fn register_user(
    server: &axum_test::TestServer,
    pool: &sqlx::PgPool,
    email: &str,
    username: &str,
) -> String {
    let response = server
        .post("/api/auth/send-code")
        .json(&json!({"email": email}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let code = pending_code(pool, email).await;
    let response = server
        .post("/api/auth/verify-code")
        .json(&json!({"email": email, "code": code}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .post("/api/auth/register")
        .json(&json!({"email": email, "username": username, "password": "Abc123!@"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_full_registration_and_login_flow() {
    let (server, pool) = db_server().await;

    let token = register_user(&server, &pool, "alice@example.com", "alice").await;
    assert!(!token.is_empty());

    // Consumed code cannot be reused for a second registration.
    let response = server
        .post("/api/auth/send-code")
        .json(&json!({"email": "alice@example.com"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/auth/login")
        .json(&json!({"credential": "alice", "password": "Abc123!@"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["role"], "USER");

    let response = server
        .post("/api/auth/login")
        .json(&json!({"credential": "alice", "password": "wrong"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_wrong_code_attempts_are_bounded() {
    let (server, pool) = db_server().await;

    let response = server
        .post("/api/auth/send-code")
        .json(&json!({"email": "bob@example.com"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let code = pending_code(&pool, "bob@example.com").await;

    for left in [2, 1, 0] {
        let response = server
            .post("/api/auth/verify-code")
            .json(&json!({"email": "bob@example.com", "code": "000000"}))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(
            body["error"].as_str().unwrap().contains(&left.to_string()),
            "expected {} attempts left in {}",
            left,
            body["error"]
        );
    }

    // Attempts exhausted: even the correct code is refused now.
    let response = server
        .post("/api/auth/verify-code")
        .json(&json!({"email": "bob@example.com", "code": code}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "No attempts left");

    // The exhausted record was consumed.
    let response = server
        .post("/api/auth/verify-code")
        .json(&json!({"email": "bob@example.com", "code": code}))
        .await;
    let body: Value = response.json();
    assert_eq!(body["error"], "No verification request found");
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_forgot_password_is_uniform() {
    let (server, pool) = db_server().await;
    register_user(&server, &pool, "carol@example.com", "carol").await;

    let known = server
        .post("/api/auth/forgot-password")
        .json(&json!({"email": "carol@example.com"}))
        .await;
    let unknown = server
        .post("/api/auth/forgot-password")
        .json(&json!({"email": "ghost@example.com"}))
        .await;

    assert_eq!(known.status_code(), StatusCode::OK);
    assert_eq!(unknown.status_code(), StatusCode::OK);
    let known: Value = known.json();
    let unknown: Value = unknown.json();
    assert_eq!(known["message"], unknown["message"]);

    // Reset with the issued code, then log in with the new password.
    let code = pending_code(&pool, "carol@example.com").await;
    let response = server
        .post("/api/auth/reset-password")
        .json(&json!({
            "email": "carol@example.com",
            "code": code,
            "newPassword": "Xyz789!@"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .post("/api/auth/login")
        .json(&json!({"credential": "carol@example.com", "password": "Xyz789!@"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_recipe_comment_and_vote_flow() {
    let (server, pool) = db_server().await;
    let token = register_user(&server, &pool, "dave@example.com", "dave").await;
    let auth = format!("Bearer {token}");
    seed_dish(&pool, "52772", "Teriyaki Chicken").await;

    // Dish listing synthesizes a default recipe before any user recipe.
    let response = server.get("/api/dishes").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["total"], 1);
    assert!(body["dishes"][0]["recipes"][0]["id"].is_null());

    let response = server
        .post("/api/recipes")
        .add_header("authorization", auth.clone())
        .json(&json!({
            "dishId": "52772",
            "title": "My teriyaki",
            "instructions": "Marinate overnight.",
            "ingredients": "[\"chicken\",\"mirin\"]"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let recipe: Value = response.json();
    let recipe_id = recipe["id"].as_str().unwrap().to_string();
    assert_eq!(recipe["author"]["username"], "dave");

    let response = server
        .post(&format!("/api/recipes/{recipe_id}/comments"))
        .add_header("authorization", auth.clone())
        .json(&json!({"text": "Great with rice"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .post(&format!("/api/recipes/{recipe_id}/vote"))
        .add_header("authorization", auth.clone())
        .json(&json!({"type": "UP"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // Re-voting replaces, not duplicates.
    let response = server
        .post(&format!("/api/recipes/{recipe_id}/vote"))
        .add_header("authorization", auth.clone())
        .json(&json!({"type": "DOWN"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server.get(&format!("/api/recipes/{recipe_id}")).await;
    let detail: Value = response.json();
    assert_eq!(detail["upvotes"], 0);
    assert_eq!(detail["downvotes"], 1);
    assert_eq!(detail["commentCount"], 1);
    assert_eq!(detail["comments"][0]["text"], "Great with rice");

    let response = server
        .delete(&format!("/api/recipes/{recipe_id}/vote"))
        .add_header("authorization", auth.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_recipe_ownership_is_enforced() {
    let (server, pool) = db_server().await;
    let owner = register_user(&server, &pool, "erin@example.com", "erin").await;
    let other = register_user(&server, &pool, "frank@example.com", "frank").await;
    seed_dish(&pool, "52772", "Teriyaki Chicken").await;

    let response = server
        .post("/api/recipes")
        .add_header("authorization", format!("Bearer {owner}"))
        .json(&json!({"dishId": "52772", "title": "Erin's"}))
        .await;
    let recipe: Value = response.json();
    let recipe_id = recipe["id"].as_str().unwrap();

    let response = server
        .delete(&format!("/api/recipes/{recipe_id}"))
        .add_header("authorization", format!("Bearer {other}"))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server
        .delete(&format!("/api/recipes/{recipe_id}"))
        .add_header("authorization", format!("Bearer {owner}"))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_email_change_flow() {
    let (server, pool) = db_server().await;
    let token = register_user(&server, &pool, "gina@example.com", "gina").await;
    let auth = format!("Bearer {token}");

    let response = server
        .post("/api/me/send-change-code")
        .add_header("authorization", auth.clone())
        .json(&json!({"newEmail": "gina.new@example.com"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let code = pending_code(&pool, "gina.new@example.com").await;
    let response = server
        .post("/api/me/confirm-change-code")
        .add_header("authorization", auth.clone())
        .json(&json!({"code": code}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .get("/api/me")
        .add_header("authorization", auth)
        .await;
    let body: Value = response.json();
    assert_eq!(body["email"], "gina.new@example.com");
}
