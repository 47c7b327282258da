/**
 * Admin Moderation Handlers
 *
 * User management endpoints under /api/admin. Every handler checks the
 * caller's capabilities first; the role hierarchy additionally bounds
 * which accounts an ADMIN may touch (regular users only) and which
 * roles may be granted at all.
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use bcrypt::{hash, DEFAULT_COST};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::handlers::types::UserResponse;
use crate::auth::normalize;
use crate::auth::password::validate_password;
use crate::auth::users::{
    admin_update_user, delete_user, get_user_by_email, get_user_by_id, get_user_by_username,
    is_valid_username, list_users, Capability, Role, User,
};
use crate::error::ApiError;
use crate::middleware::{require, AuthUser, Principal};
use crate::server::state::AppState;

/// Admin edit request; unset fields are left unchanged
#[derive(Debug, Deserialize, Serialize)]
pub struct AdminUpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

fn parse_user_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::validation("Invalid user id"))
}

/// An ADMIN may only act on regular users; SUPERADMIN on anyone
fn ensure_can_manage(principal: &Principal, target: &User) -> Result<(), ApiError> {
    if target.role == Role::User || principal.role.can(Capability::ManageAdmins) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Cannot manage this account"))
    }
}

/// GET /api/admin/users
pub async fn admin_list_users(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    require(&principal, Capability::ModerateUsers)?;

    let users = list_users(&state.pool).await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// PUT /api/admin/users/{id}
pub async fn admin_update(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    Json(request): Json<AdminUpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    require(&principal, Capability::ModerateUsers)?;

    let id = parse_user_id(&id)?;
    let target = get_user_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    ensure_can_manage(&principal, &target)?;

    let username = match request.username.as_deref() {
        Some(raw) => {
            let username = normalize(raw);
            if !is_valid_username(&username) {
                return Err(ApiError::validation(
                    "Username must be 3-20 characters (letters, digits, _ or -)",
                ));
            }
            if let Some(existing) = get_user_by_username(&state.pool, &username).await? {
                if existing.id != id {
                    return Err(ApiError::conflict("Username taken"));
                }
            }
            Some(username)
        }
        None => None,
    };

    let email = match request.email.as_deref() {
        Some(raw) => {
            let email = normalize(raw);
            if email.is_empty() {
                return Err(ApiError::validation("Email cannot be empty"));
            }
            if let Some(existing) = get_user_by_email(&state.pool, &email).await? {
                if existing.id != id {
                    return Err(ApiError::conflict("Email already registered"));
                }
            }
            Some(email)
        }
        None => None,
    };

    let password_hash = match request.password.as_deref() {
        Some(password) => {
            validate_password(password)?;
            Some(hash(password, DEFAULT_COST)?)
        }
        None => None,
    };

    if let Some(role) = request.role {
        require(&principal, Capability::AssignRoles)?;
        if role == Role::Superadmin {
            return Err(ApiError::forbidden("Cannot grant this role"));
        }
    }

    let updated = admin_update_user(
        &state.pool,
        id,
        username.as_deref(),
        email.as_deref(),
        password_hash.as_deref(),
        request.role,
    )
    .await?;

    tracing::info!("user {} updated by admin {}", id, principal.user_id);

    Ok(Json(UserResponse::from(&updated)))
}

/// DELETE /api/admin/users/{id}
pub async fn admin_delete(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require(&principal, Capability::ModerateUsers)?;

    let id = parse_user_id(&id)?;
    if id == principal.user_id {
        return Err(ApiError::validation("Cannot delete your own account here"));
    }

    let target = get_user_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    ensure_can_manage(&principal, &target)?;

    delete_user(&state.pool, id).await?;

    tracing::info!(
        "user {} ({}) deleted by admin {}",
        id,
        target.username,
        principal.user_id
    );

    Ok(StatusCode::NO_CONTENT)
}
