/**
 * Profile Handlers
 *
 * Authenticated endpoints under /api/me:
 *
 * - GET /api/me - fetch own profile
 * - PUT /api/me - update username
 * - POST /api/me/change-password - rotate password
 * - GET /api/me/recipes - list own recipes
 * - POST /api/me/delete-account - delete the account and all owned data
 */

use axum::{extract::State, http::StatusCode, response::Json};
use bcrypt::{hash, verify, DEFAULT_COST};

use crate::auth::handlers::types::{
    ChangePasswordRequest, DeleteAccountRequest, MessageResponse, UpdateProfileRequest,
    UserResponse,
};
use crate::auth::normalize;
use crate::auth::password::validate_password;
use crate::auth::users::{
    delete_user, get_user_by_id, get_user_by_username, is_valid_username, update_password,
    update_username,
};
use crate::catalog::recipes::{list_recipes_for_user, RecipeView};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::server::state::AppState;

/// GET /api/me
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = get_user_by_id(&state.pool, principal.user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(UserResponse::from(&user)))
}

/// PUT /api/me
///
/// Only the username is editable here. Email changes go through the
/// verified change-code flow instead.
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let username = match request.username {
        Some(raw) => normalize(&raw),
        None => return Err(ApiError::validation("Nothing to update")),
    };

    if !is_valid_username(&username) {
        return Err(ApiError::validation(
            "Username must be 3-20 characters (letters, digits, _ or -)",
        ));
    }

    if let Some(existing) = get_user_by_username(&state.pool, &username).await? {
        if existing.id != principal.user_id {
            return Err(ApiError::conflict("Username taken"));
        }
    }

    let user = update_username(&state.pool, principal.user_id, &username).await?;

    tracing::info!("username updated for user {}", principal.user_id);

    Ok(Json(UserResponse::from(&user)))
}

/// POST /api/me/change-password
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if request.current_password.is_empty() {
        return Err(ApiError::validation("Current password required"));
    }
    validate_password(&request.new_password)?;

    let user = get_user_by_id(&state.pool, principal.user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !verify(&request.current_password, &user.password_hash)? {
        return Err(ApiError::validation("Current password is incorrect"));
    }

    let password_hash = hash(&request.new_password, DEFAULT_COST)?;
    update_password(&state.pool, user.id, &password_hash).await?;

    tracing::info!("password changed for user {}", user.id);

    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// GET /api/me/recipes
pub async fn my_recipes(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<Vec<RecipeView>>, ApiError> {
    let recipes = list_recipes_for_user(&state.pool, principal.user_id).await?;
    Ok(Json(recipes))
}

/// POST /api/me/delete-account
///
/// Requires password confirmation. Recipes, comments and votes owned by
/// the account are removed by the schema's cascade rules.
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(request): Json<DeleteAccountRequest>,
) -> Result<StatusCode, ApiError> {
    if request.password.is_empty() {
        return Err(ApiError::validation("Password required"));
    }

    let user = get_user_by_id(&state.pool, principal.user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !verify(&request.password, &user.password_hash)? {
        return Err(ApiError::validation("Password is incorrect"));
    }

    delete_user(&state.pool, user.id).await?;

    tracing::info!("account deleted: {} ({})", user.username, user.email);

    Ok(StatusCode::NO_CONTENT)
}
