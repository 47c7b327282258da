/**
 * User Model and Database Operations
 *
 * This module handles user data, roles and the capability checks derived
 * from them, plus all user-table database operations.
 *
 * # Roles and Capabilities
 *
 * Roles are stored in the database as a Postgres enum (`USER`, `ADMIN`,
 * `SUPERADMIN`). Handlers never compare role strings directly; they ask
 * `Role::can(Capability)` so the rules live in exactly one place.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User role
///
/// Stored in Postgres as the `user_role` enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
    Superadmin,
}

/// An action gated by role
///
/// Every privileged code path names the capability it needs instead of
/// inspecting role values, so the role-to-permission mapping cannot
/// drift between call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// List, edit and delete regular user accounts
    ModerateUsers,
    /// Edit and delete admin accounts as well
    ManageAdmins,
    /// Change another account's role
    AssignRoles,
    /// Edit or delete recipes owned by other users
    EditAnyRecipe,
}

impl Role {
    /// Check whether this role grants a capability
    pub fn can(self, capability: Capability) -> bool {
        match capability {
            Capability::ModerateUsers | Capability::EditAnyRecipe => {
                matches!(self, Role::Admin | Role::Superadmin)
            }
            Capability::ManageAdmins | Capability::AssignRoles => {
                matches!(self, Role::Superadmin)
            }
        }
    }
}

/// User struct representing a user in the database
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID)
    pub id: Uuid,
    /// Username (unique, normalized lowercase)
    pub username: String,
    /// User email address (unique, normalized lowercase)
    pub email: String,
    /// Hashed password (bcrypt)
    pub password_hash: String,
    /// Role (USER, ADMIN, SUPERADMIN)
    pub role: Role,
    /// Optional avatar file name
    pub profile_picture: Option<String>,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp
    pub updated_at: DateTime<Utc>,
}

const USER_COLUMNS: &str =
    "id, username, email, password_hash, role, profile_picture, created_at, updated_at";

/// Create a new user
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `username` - Normalized username
/// * `email` - Normalized email
/// * `password_hash` - Hashed password
/// * `role` - Initial role
///
/// # Returns
/// Created user or error
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<User, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (id, username, email, password_hash, role, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, now(), now())
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Get user by email
pub async fn get_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// Get user by username
pub async fn get_user_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await
}

/// Get user by ID
pub async fn get_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Get user by email-or-username credential
///
/// Login accepts either identifier; both are stored normalized so a single
/// lookup per column suffices.
pub async fn get_user_by_credential(
    pool: &PgPool,
    credential: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1 OR username = $1"
    ))
    .bind(credential)
    .fetch_optional(pool)
    .await
}

/// List all users, newest first
pub async fn list_users(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

/// Update a user's password hash
pub async fn update_password(
    pool: &PgPool,
    user_id: Uuid,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password_hash = $1, updated_at = now() WHERE id = $2")
        .bind(password_hash)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Update a user's email address
pub async fn update_email(pool: &PgPool, user_id: Uuid, email: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET email = $1, updated_at = now() WHERE id = $2")
        .bind(email)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Update a user's username
pub async fn update_username(
    pool: &PgPool,
    user_id: Uuid,
    username: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users SET username = $1, updated_at = now()
        WHERE id = $2
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(username)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

/// Apply an admin edit to a user
///
/// `None` fields are left unchanged. Returns the updated user.
pub async fn admin_update_user(
    pool: &PgPool,
    user_id: Uuid,
    username: Option<&str>,
    email: Option<&str>,
    password_hash: Option<&str>,
    role: Option<Role>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users SET
            username = COALESCE($1, username),
            email = COALESCE($2, email),
            password_hash = COALESCE($3, password_hash),
            role = COALESCE($4, role),
            updated_at = now()
        WHERE id = $5
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

/// Delete a user
///
/// Recipes, comments, votes and pending verifications cascade at the
/// schema level, so the account and all its content disappear in one
/// statement.
pub async fn delete_user(pool: &PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Validate username format
///
/// Usernames must be 3-20 characters and contain only ASCII letters,
/// digits, underscores and hyphens.
pub fn is_valid_username(username: &str) -> bool {
    let len = username.chars().count();
    if !(3..=20).contains(&len) {
        return false;
    }
    username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(is_valid_username("alice"));
        assert!(is_valid_username("a_b-c1"));
        assert!(is_valid_username("abc"));
        assert!(is_valid_username("12345678901234567890"));
    }

    #[test]
    fn test_invalid_usernames() {
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("123456789012345678901"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username("émile"));
        assert!(!is_valid_username(""));
    }

    #[test]
    fn test_admin_capabilities() {
        assert!(Role::Admin.can(Capability::ModerateUsers));
        assert!(Role::Admin.can(Capability::EditAnyRecipe));
        assert!(!Role::Admin.can(Capability::ManageAdmins));
        assert!(!Role::Admin.can(Capability::AssignRoles));
    }

    #[test]
    fn test_superadmin_capabilities() {
        assert!(Role::Superadmin.can(Capability::ModerateUsers));
        assert!(Role::Superadmin.can(Capability::ManageAdmins));
        assert!(Role::Superadmin.can(Capability::AssignRoles));
        assert!(Role::Superadmin.can(Capability::EditAnyRecipe));
    }

    #[test]
    fn test_user_has_no_capabilities() {
        assert!(!Role::User.can(Capability::ModerateUsers));
        assert!(!Role::User.can(Capability::ManageAdmins));
        assert!(!Role::User.can(Capability::AssignRoles));
        assert!(!Role::User.can(Capability::EditAnyRecipe));
    }
}
