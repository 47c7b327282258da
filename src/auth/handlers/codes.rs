/**
 * Verification Code Handlers
 *
 * Handlers for POST /api/auth/send-code and POST /api/auth/verify-code,
 * the registration-flow half of the verification service.
 *
 * # Flow
 *
 * 1. `send-code` issues and emails a 6-digit code for a not-yet-registered
 *    address (overwriting any in-flight code for the same address)
 * 2. `verify-code` checks the submitted code; success consumes the record
 * 3. `register` (see `register.rs`) then creates the account, refusing
 *    addresses that still have an unconsumed pending record
 */

use axum::{extract::State, response::Json};

use crate::auth::handlers::types::{MessageResponse, SendCodeRequest, VerifyCodeRequest};
use crate::auth::normalize;
use crate::auth::users::get_user_by_email;
use crate::auth::verification::{check_code, issue_code};
use crate::email::templates;
use crate::error::ApiError;
use crate::server::state::AppState;

/// Send a registration verification code
///
/// # Errors
///
/// * `400` - missing email, or the address is already registered
/// * `500` - database failure, or the email could not be dispatched
pub async fn send_code(
    State(state): State<AppState>,
    Json(request): Json<SendCodeRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = normalize(&request.email);
    if email.is_empty() {
        return Err(ApiError::validation("Email required"));
    }

    if get_user_by_email(&state.pool, &email).await?.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }

    let code = issue_code(&state.pool, &email, None).await?;
    tracing::info!("issued registration code for {}", email);

    let platform = state.mailer.platform_name().to_string();
    state
        .mailer
        .send(
            &email,
            &format!("{platform} - Verification Code"),
            templates::registration(&platform, &code),
        )
        .await?;

    Ok(Json(MessageResponse::new("Code sent successfully")))
}

/// Check a registration verification code
///
/// # Errors
///
/// * `400` - missing fields, no pending request, expired code, attempts
///   exhausted, or mismatch (message carries the attempts left)
pub async fn verify_code(
    State(state): State<AppState>,
    Json(request): Json<VerifyCodeRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = normalize(&request.email);
    let code = request.code.trim();
    if email.is_empty() || code.is_empty() {
        return Err(ApiError::validation("Email and code required"));
    }

    check_code(&state.pool, &email, code).await?;
    tracing::info!("verified registration code for {}", email);

    Ok(Json(MessageResponse::new("Code verified successfully")))
}
