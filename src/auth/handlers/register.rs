/**
 * Registration Handler
 *
 * This module implements the user registration handler for
 * POST /api/auth/register.
 *
 * # Registration Process
 *
 * 1. Validate username format and password strength
 * 2. Require the email verification to be complete (no pending record
 *    may remain for the address)
 * 3. Check username and email uniqueness
 * 4. Hash the password with bcrypt
 * 5. Create the user with role USER
 * 6. Return a JWT token and the public user view
 *
 * # Security
 *
 * - Passwords are hashed with bcrypt `DEFAULT_COST` and never returned
 * - Password strength rules are enforced before any database access
 */

use axum::{extract::State, response::Json};
use bcrypt::{hash, DEFAULT_COST};

use crate::auth::handlers::types::{AuthResponse, RegisterRequest, UserResponse};
use crate::auth::normalize;
use crate::auth::password::validate_password;
use crate::auth::sessions::create_token;
use crate::auth::users::{create_user, get_user_by_email, get_user_by_username, is_valid_username, Role};
use crate::auth::verification::has_pending;
use crate::error::ApiError;
use crate::server::state::AppState;

/// Registration handler
///
/// # Errors
///
/// * `400` - missing fields, weak password, invalid username, email not
///   verified yet, or duplicate username/email
/// * `500` - hashing, token generation or database failure
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = normalize(&request.email);
    let username = normalize(&request.username);

    if email.is_empty() || username.is_empty() || request.password.is_empty() {
        return Err(ApiError::validation("All fields required"));
    }

    if !is_valid_username(&username) {
        return Err(ApiError::validation(
            "Username must be 3-20 chars, letters, numbers, _ or - only",
        ));
    }

    validate_password(&request.password)?;

    // An unconsumed pending record means verify-code was never completed
    // for this address.
    if has_pending(&state.pool, &email).await? {
        return Err(ApiError::validation("Please verify your email first"));
    }

    if get_user_by_email(&state.pool, &email).await?.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }

    if get_user_by_username(&state.pool, &username).await?.is_some() {
        return Err(ApiError::conflict("Username taken"));
    }

    let password_hash = hash(&request.password, DEFAULT_COST)?;

    let user = create_user(&state.pool, &username, &email, &password_hash, Role::User).await?;
    let token = create_token(user.id)?;

    tracing::info!("user registered: {} ({})", user.username, user.email);

    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from(&user),
    }))
}
