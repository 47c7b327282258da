/**
 * Password Reset Handlers
 *
 * Two-step recovery flow for users who lost their password:
 *
 * 1. POST /api/auth/forgot-password - issues a verification code when the
 *    account exists. The response is identical whether the account exists
 *    or not, so the endpoint cannot be used to enumerate accounts.
 * 2. POST /api/auth/reset-password - verifies the code and stores the new
 *    bcrypt hash.
 */

use axum::{extract::State, response::Json};
use bcrypt::{hash, DEFAULT_COST};

use crate::auth::handlers::types::{ForgotPasswordRequest, MessageResponse, ResetPasswordRequest};
use crate::auth::normalize;
use crate::auth::password::validate_password;
use crate::auth::users::{get_user_by_email, update_password};
use crate::auth::verification::{check_code, issue_code};
use crate::email::templates;
use crate::error::ApiError;
use crate::server::state::AppState;

const FORGOT_MESSAGE: &str = "If the email exists, a code has been sent";

/// Forgot-password handler
///
/// Always returns `200` with the same message. A code is only issued (and
/// emailed) when the address belongs to an account; mail failures are
/// logged and swallowed so the response stays uniform.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = normalize(&request.email);
    if email.is_empty() {
        return Err(ApiError::validation("Email required"));
    }

    if get_user_by_email(&state.pool, &email).await?.is_some() {
        let code = issue_code(&state.pool, &email, None).await?;

        let body = templates::password_reset(state.mailer.platform_name(), &code);
        if let Err(err) = state.mailer.send(&email, "Password reset code", body).await {
            tracing::error!("failed to send reset code to {}: {}", email, err);
        } else {
            tracing::info!("password reset code issued for {}", email);
        }
    }

    Ok(Json(MessageResponse::new(FORGOT_MESSAGE)))
}

/// Reset-password handler
///
/// The new password is strength-checked before the code is consumed, so a
/// weak password does not burn a valid code.
///
/// # Errors
///
/// * `400` - missing fields, weak password, or code rejection
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = normalize(&request.email);
    if email.is_empty() || request.code.is_empty() {
        return Err(ApiError::validation("Email and code required"));
    }

    validate_password(&request.new_password)?;

    let user = get_user_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| ApiError::validation("Invalid credentials"))?;

    check_code(&state.pool, &email, &request.code).await?;

    let password_hash = hash(&request.new_password, DEFAULT_COST)?;
    update_password(&state.pool, user.id, &password_hash).await?;

    tracing::info!("password reset completed for {}", email);

    Ok(Json(MessageResponse::new("Password reset successfully")))
}
