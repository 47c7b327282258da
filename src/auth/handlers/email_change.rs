/**
 * Email Change Handlers
 *
 * Authenticated two-step flow for changing the account email address:
 *
 * 1. POST /api/me/send-change-code - issues a verification code to the
 *    *new* address, replacing any pending change for this account.
 * 2. POST /api/me/confirm-change-code - verifies the code and rewrites
 *    the account email.
 *
 * The code goes to the new address so the user proves control of the
 * mailbox before the account points at it.
 */

use axum::{extract::State, response::Json};

use crate::auth::handlers::types::{ConfirmChangeCodeRequest, MessageResponse, SendChangeCodeRequest};
use crate::auth::normalize;
use crate::auth::users::{get_user_by_email, update_email};
use crate::auth::verification::{check_code_for_user, issue_change_code};
use crate::email::templates;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::server::state::AppState;

/// Send-change-code handler
///
/// # Errors
///
/// * `400` - missing address or address already in use
/// * `500` - database or mail failure
pub async fn send_change_code(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(request): Json<SendChangeCodeRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let new_email = normalize(&request.new_email);
    if new_email.is_empty() {
        return Err(ApiError::validation("Email required"));
    }

    if get_user_by_email(&state.pool, &new_email).await?.is_some() {
        return Err(ApiError::validation("Email already in use"));
    }

    let code = issue_change_code(&state.pool, principal.user_id, &new_email).await?;

    let body = templates::email_change(state.mailer.platform_name(), &code);
    state
        .mailer
        .send(&new_email, "Confirm your new email", body)
        .await?;

    tracing::info!(
        "email change code issued for user {} -> {}",
        principal.user_id,
        new_email
    );

    Ok(Json(MessageResponse::new("Code sent successfully")))
}

/// Confirm-change-code handler
///
/// The pending row is looked up by the authenticated user, not by email,
/// so the client only submits the code itself.
///
/// # Errors
///
/// * `400` - missing code or code rejection
pub async fn confirm_change_code(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(request): Json<ConfirmChangeCodeRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if request.code.trim().is_empty() {
        return Err(ApiError::validation("Code required"));
    }

    let new_email = check_code_for_user(&state.pool, principal.user_id, &request.code).await?;

    // The address could have been claimed while the code was in flight.
    if get_user_by_email(&state.pool, &new_email).await?.is_some() {
        return Err(ApiError::validation("Email already in use"));
    }

    update_email(&state.pool, principal.user_id, &new_email).await?;

    tracing::info!("email updated for user {} -> {}", principal.user_id, new_email);

    Ok(Json(MessageResponse::new("Email updated successfully")))
}
