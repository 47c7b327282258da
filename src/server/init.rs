/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP
 * server: database connection, migrations, admin seeding, mailer
 * construction and route configuration.
 *
 * # Initialization Process
 *
 * 1. Connect to PostgreSQL (fatal on failure - verification state lives
 *    in the database)
 * 2. Run embedded migrations
 * 3. Seed the configured SUPERADMIN account if absent
 * 4. Build the mailer (log-only when SMTP is unconfigured)
 * 5. Create the router with all routes and the CORS layer
 */

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;

use crate::auth::users::{create_user, get_user_by_email, Role};
use crate::auth::normalize;
use crate::email::Mailer;
use crate::routes::router::create_router;
use crate::server::config::{AppConfig, SeedAdmin, StartupError};
use crate::server::state::AppState;

/// Create and configure the Axum application
///
/// # Errors
///
/// Fails when the database is unreachable, migrations cannot be applied,
/// or the configured SMTP relay address is invalid.
pub async fn create_app(config: AppConfig) -> Result<Router<()>, StartupError> {
    tracing::info!("Initializing RecipeShare backend server");

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&config.database_url).await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!().run(&pool).await?;

    if let Some(seed) = &config.seed_admin {
        seed_admin(&pool, seed).await?;
    }

    let mailer = Mailer::new(config.smtp.as_ref(), &config.platform_name)?;

    let app_state = AppState {
        pool,
        mailer,
        config: Arc::new(config),
    };

    tracing::info!("Router configured");
    Ok(create_router(app_state))
}

/// Create the configured SUPERADMIN account when it does not exist
///
/// The username is derived from the local part of the email address.
async fn seed_admin(pool: &PgPool, seed: &SeedAdmin) -> Result<(), StartupError> {
    let email = normalize(&seed.email);

    if get_user_by_email(pool, &email).await?.is_some() {
        tracing::debug!("seed admin {} already exists", email);
        return Ok(());
    }

    let username = email.split('@').next().unwrap_or("superadmin").to_string();
    let password_hash = bcrypt::hash(&seed.password, bcrypt::DEFAULT_COST)?;

    create_user(pool, &username, &email, &password_hash, Role::Superadmin).await?;
    tracing::info!("created seed superadmin account: {}", email);

    Ok(())
}
