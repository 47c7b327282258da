/**
 * Server Configuration
 *
 * This module loads server configuration from environment variables.
 *
 * # Configuration Sources
 *
 * Configuration is read once at startup, with development defaults where
 * a missing value is survivable. `DATABASE_URL` is required: the
 * verification flow keeps its state in the database so the server refuses
 * to start without one.
 *
 * # Variables
 *
 * - `DATABASE_URL` (required) - PostgreSQL connection string
 * - `SERVER_PORT` - listen port, default 5000
 * - `CORS_ORIGIN` - allowed browser origin, default `http://localhost:5173`
 * - `PLATFORM_NAME` - name used in email subjects, default `RecipeShare`
 * - `SMTP_HOST` / `SMTP_USER` / `SMTP_PASS` - SMTP relay; when unset the
 *   mailer runs in log-only mode
 * - `SEED_ADMIN_EMAIL` / `SEED_ADMIN_PASSWORD` - create a SUPERADMIN
 *   account at startup when it does not exist yet
 */

use thiserror::Error;

use crate::email::MailError;

/// Startup failure
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("missing required environment variable {0}")]
    MissingEnv(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("mailer error: {0}")]
    Mail(#[from] MailError),

    #[error("password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// SMTP relay credentials
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub user: String,
    pub pass: String,
}

/// Seed account created at startup when absent
#[derive(Debug, Clone)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub cors_origin: String,
    pub platform_name: String,
    pub smtp: Option<SmtpConfig>,
    pub seed_admin: Option<SeedAdmin>,
}

impl AppConfig {
    /// Load configuration from the environment
    pub fn from_env() -> Result<Self, StartupError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| StartupError::MissingEnv("DATABASE_URL"))?;

        let port = std::env::var("SERVER_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(5000);

        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        let platform_name =
            std::env::var("PLATFORM_NAME").unwrap_or_else(|_| "RecipeShare".to_string());

        let smtp = match (
            std::env::var("SMTP_HOST"),
            std::env::var("SMTP_USER"),
            std::env::var("SMTP_PASS"),
        ) {
            (Ok(host), Ok(user), Ok(pass)) => Some(SmtpConfig { host, user, pass }),
            _ => None,
        };

        let seed_admin = match (
            std::env::var("SEED_ADMIN_EMAIL"),
            std::env::var("SEED_ADMIN_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) => Some(SeedAdmin { email, password }),
            _ => None,
        };

        Ok(Self {
            database_url,
            port,
            cors_origin,
            platform_name,
            smtp,
            seed_admin,
        })
    }
}
