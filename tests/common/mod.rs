//! Shared test helpers
//!
//! Two server constructors:
//!
//! - [`offline_server`] uses a lazy pool that never connects; good for
//!   exercising routing, validation and auth rejection paths that fail
//!   before any query runs.
//! - [`db_server`] connects to `DATABASE_URL`, applies migrations and
//!   truncates all tables; used by the ignored end-to-end tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use sqlx::PgPool;

use recipeshare::email::Mailer;
use recipeshare::routes::create_router;
use recipeshare::server::config::AppConfig;
use recipeshare::AppState;

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://localhost/unused".to_string(),
        port: 0,
        cors_origin: "http://localhost:5173".to_string(),
        platform_name: "RecipeShare".to_string(),
        smtp: None,
        seed_admin: None,
    }
}

fn state_with_pool(pool: PgPool) -> AppState {
    let config = test_config();
    let mailer = Mailer::new(None, &config.platform_name).unwrap();
    AppState {
        pool,
        mailer,
        config: Arc::new(config),
    }
}

/// Server over a pool that never actually connects
pub fn offline_server() -> TestServer {
    let pool = PgPool::connect_lazy("postgres://localhost/unused").unwrap();
    TestServer::new(create_router(state_with_pool(pool))).unwrap()
}

/// Server over a real database, migrated and emptied
///
/// Panics when `DATABASE_URL` is unset; callers are `#[ignore]`d so this
/// only runs when a database was provided on purpose.
pub async fn db_server() -> (TestServer, PgPool) {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for DB tests");
    let pool = PgPool::connect(&url).await.unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();

    sqlx::query("TRUNCATE users, pending_verifications, dishes, recipes, comments, votes CASCADE")
        .execute(&pool)
        .await
        .unwrap();

    let server = TestServer::new(create_router(state_with_pool(pool.clone()))).unwrap();
    (server, pool)
}

/// Insert a catalog dish for recipe tests
pub async fn seed_dish(pool: &PgPool, id_meal: &str, name: &str) {
    sqlx::query(
        "INSERT INTO dishes (id_meal, name, category, area, instructions, ingredients) \
         VALUES ($1, $2, 'Chicken', 'Japanese', 'Grill it.', '[\"chicken\"]')",
    )
    .bind(id_meal)
    .bind(name)
    .execute(pool)
    .await
    .unwrap();
}

/// Read the pending verification code straight from the store
pub async fn pending_code(pool: &PgPool, email: &str) -> String {
    sqlx::query_scalar("SELECT code FROM pending_verifications WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await
        .unwrap()
}
