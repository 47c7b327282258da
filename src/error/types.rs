/**
 * API Error Types
 *
 * This module defines the error taxonomy used by all HTTP handlers.
 *
 * # Error Categories
 *
 * - `Validation` - malformed or missing input (400)
 * - `NotFound` - unknown resource (404)
 * - `Unauthorized` - missing or invalid session token (401)
 * - `Forbidden` - authenticated but lacking the required capability (403)
 * - `Conflict` - duplicate username/email (400, matching the public API contract)
 * - `Verify` - verification-code failures: not found, expired, attempts
 *   exhausted, mismatch (400 with a descriptive message)
 * - `Database` / `Hash` / `Token` / `Mail` - unexpected infrastructure
 *   failures (500, details logged server-side only)
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::auth::verification::VerifyError;
use crate::email::MailError;

/// API error type returned by HTTP handlers
///
/// Each variant maps to an HTTP status code via [`ApiError::status_code`].
/// Client-facing messages come from the `Display` impl; infrastructure
/// variants render a generic message so internal details are not leaked.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    /// Unknown resource
    #[error("{0}")]
    NotFound(String),

    /// Missing or invalid session token
    #[error("Invalid or expired token")]
    Unauthorized,

    /// Authenticated but not allowed to perform the action
    #[error("{0}")]
    Forbidden(String),

    /// Duplicate username or email
    #[error("{0}")]
    Conflict(String),

    /// Verification-code failure
    #[error(transparent)]
    Verify(#[from] VerifyError),

    /// Database failure
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Password hashing failure
    #[error("password hashing failed")]
    Hash(#[from] bcrypt::BcryptError),

    /// Session token signing failure
    #[error("token generation failed")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Outbound email dispatch failure
    #[error("failed to send email")]
    Mail(#[from] MailError),
}

impl ApiError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `Validation`, `Conflict`, `Verify` - 400 Bad Request
    /// - `NotFound` - 404 Not Found
    /// - `Unauthorized` - 401 Unauthorized
    /// - `Forbidden` - 403 Forbidden
    /// - everything else - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Conflict(_) | Self::Verify(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Database(_) | Self::Hash(_) | Self::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Mail(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the client-facing error message
    ///
    /// Infrastructure failures return a generic message; the underlying
    /// error is logged where the response is built.
    pub fn message(&self) -> String {
        match self {
            Self::Database(_) | Self::Hash(_) | Self::Token(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Whether this error should be logged at error level server-side
    pub fn is_internal(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }
}
