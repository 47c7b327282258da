/**
 * Login Handler
 *
 * This module implements the user authentication handler for
 * POST /api/auth/login.
 *
 * # Security
 *
 * - The credential may be an email address or a username
 * - Unknown user and wrong password produce the identical error, so the
 *   endpoint does not reveal which accounts exist
 * - Password verification uses bcrypt's constant-time comparison
 */

use axum::{extract::State, response::Json};
use bcrypt::verify;

use crate::auth::handlers::types::{AuthResponse, LoginRequest, UserResponse};
use crate::auth::normalize;
use crate::auth::sessions::create_token;
use crate::auth::users::get_user_by_credential;
use crate::error::ApiError;
use crate::server::state::AppState;

/// Login handler
///
/// # Errors
///
/// * `400` - missing fields or invalid credentials
/// * `500` - database or token generation failure
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let credential = normalize(&request.credential);
    if credential.is_empty() || request.password.is_empty() {
        return Err(ApiError::validation("Credential and password required"));
    }

    let user = get_user_by_credential(&state.pool, &credential)
        .await?
        .ok_or_else(|| ApiError::validation("Invalid credentials"))?;

    if !verify(&request.password, &user.password_hash)? {
        tracing::warn!("failed login attempt for {}", credential);
        return Err(ApiError::validation("Invalid credentials"));
    }

    let token = create_token(user.id)?;

    tracing::info!("user logged in: {} ({})", user.username, user.email);

    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from(&user),
    }))
}
