//! RecipeShare - Main Library
//!
//! RecipeShare is the backend for a recipe-sharing web application built with
//! Rust. Users browse a catalog of dishes, submit and edit their own recipes
//! for a dish, comment, upvote/downvote, and manage their accounts.
//!
//! # Overview
//!
//! This library provides the core functionality for RecipeShare, including:
//! - Account lifecycle: registration with email verification, login,
//!   password reset, email change, profile editing
//! - Short-lived one-time verification codes with bounded attempts
//! - Dish catalog with user-submitted recipes, comments and votes
//! - Admin moderation with capability-based role checks
//! - PostgreSQL persistence via sqlx with embedded migrations
//!
//! # Module Structure
//!
//! The library is organized into focused modules:
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`auth`** - Authentication, JWT sessions, verification codes, users
//! - **`catalog`** - Dishes, recipes, comments and votes
//! - **`admin`** - User moderation endpoints
//! - **`middleware`** - Request authentication middleware
//! - **`email`** - Outbound notification dispatch (SMTP)
//! - **`error`** - API error types and HTTP conversion

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Authentication, sessions and verification codes
pub mod auth;

/// Dish catalog, recipes, comments and votes
pub mod catalog;

/// Admin moderation
pub mod admin;

/// Request processing middleware
pub mod middleware;

/// Outbound email dispatch
pub mod email;

/// API error types
pub mod error;

/// Re-export commonly used types
pub use error::ApiError;
pub use server::create_app;
pub use server::state::AppState;
