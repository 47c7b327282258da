//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Route Groups
//!
//! - Public: auth endpoints and catalog browsing
//! - Account: profile, recipe authoring, comments, votes (token required)
//! - Admin: user moderation (token plus capability checks)
//!
//! The main assembly lives in [`router::create_router`].

/// Main router creation
pub mod router;

pub use router::create_router;
