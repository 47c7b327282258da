//! API Error Module
//!
//! This module defines the error types returned by HTTP handlers and their
//! conversion to HTTP responses.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - Error conversion implementations
//! ```
//!
//! # HTTP Response Conversion
//!
//! All API errors implement `IntoResponse` from Axum, allowing them to be
//! returned directly from handlers with the `?` operator. The error is
//! converted to an appropriate HTTP status code and a JSON body of the form
//! `{"error": "..."}`. Internal errors (database, hashing, token signing,
//! mail dispatch) are logged server-side and never leak details to clients.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::ApiError;
