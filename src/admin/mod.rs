/**
 * Admin Moderation
 *
 * Capability-gated user management endpoints.
 */

pub mod handlers;

pub use handlers::{admin_delete, admin_list_users, admin_update};
