//! Authentication and Account Management
//!
//! This module contains everything tied to user identity:
//!
//! - **`users`** - user model, roles/capabilities, database operations
//! - **`sessions`** - JWT session token creation and verification
//! - **`verification`** - short-lived one-time email codes (the
//!   registration / password-reset / email-change gate)
//! - **`password`** - password strength policy
//! - **`handlers`** - HTTP handlers for the auth and account endpoints

/// User model and database operations
pub mod users;

/// JWT session tokens
pub mod sessions;

/// One-time verification codes
pub mod verification;

/// Password strength policy
pub mod password;

/// HTTP handlers for auth and account endpoints
pub mod handlers;

/// Normalize an email address or username for storage and lookup
///
/// All identity lookups go through trimmed, lower-cased values so that
/// `" User@Example.COM "` and `"user@example.com"` refer to the same
/// account.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}
