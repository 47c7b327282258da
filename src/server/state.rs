/**
 * Application State Management
 *
 * This module defines the application state structure and implements the
 * necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct is the central state container for the
 * application, holding:
 * - The PostgreSQL connection pool (the only shared mutable resource;
 *   consistency is delegated to the database)
 * - The SMTP mailer
 * - The loaded configuration
 *
 * All fields are cheap to clone; handlers extract the parts they need via
 * `FromRef` without taking the whole state.
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::email::Mailer;
use crate::server::config::AppConfig;

/// Application state shared by all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub pool: PgPool,

    /// Outbound email dispatch
    pub mailer: Mailer,

    /// Loaded configuration
    pub config: Arc<AppConfig>,
}

/// Allow handlers to extract the pool directly with `State(pool)`
impl FromRef<AppState> for PgPool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.pool.clone()
    }
}

/// Allow handlers to extract the mailer directly with `State(mailer)`
impl FromRef<AppState> for Mailer {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.mailer.clone()
    }
}

/// Allow handlers to extract the configuration directly
impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
