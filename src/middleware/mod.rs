//! Request Processing Middleware

/// Authentication middleware and extractors
pub mod auth;

pub use auth::{auth_middleware, require, AuthUser, Principal};
