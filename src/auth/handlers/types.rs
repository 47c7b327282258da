/**
 * Authentication Handler Types
 *
 * Request and response types shared across the auth and account handlers.
 * Wire names are camelCase to match the public API contract consumed by
 * the single-page client.
 */

use serde::{Deserialize, Serialize};

use crate::auth::users::{Role, User};

/// Request a verification code for registration
#[derive(Deserialize, Serialize, Debug)]
pub struct SendCodeRequest {
    pub email: String,
}

/// Check a verification code
#[derive(Deserialize, Serialize, Debug)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

/// Registration request
#[derive(Deserialize, Serialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Login request
///
/// `credential` accepts either email or username.
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub credential: String,
    pub password: String,
}

/// Forgot-password request
#[derive(Deserialize, Serialize, Debug)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Reset-password request
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

/// Change-password request (authenticated)
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Profile update request (authenticated)
#[derive(Deserialize, Serialize, Debug)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
}

/// Account deletion request (authenticated)
#[derive(Deserialize, Serialize, Debug)]
pub struct DeleteAccountRequest {
    pub password: String,
}

/// Email-change code request (authenticated)
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SendChangeCodeRequest {
    pub new_email: String,
}

/// Email-change confirmation request (authenticated)
#[derive(Deserialize, Serialize, Debug)]
pub struct ConfirmChangeCodeRequest {
    pub code: String,
}

/// Auth response returned by register and login
#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    /// JWT token (30-day expiration)
    pub token: String,
    /// Public user view
    pub user: UserResponse,
}

/// Public user view (no sensitive data)
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub profile_picture: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            profile_picture: user.profile_picture.clone(),
        }
    }
}

/// Plain confirmation message
#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
