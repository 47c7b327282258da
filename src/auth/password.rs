/**
 * Password Strength Policy
 *
 * Passwords must be at least 8 characters and contain an uppercase letter,
 * a digit and a special character. Each failed rule is reported
 * individually so clients can show the user exactly what is missing.
 */

use crate::error::ApiError;

/// Special characters accepted by the policy
const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

/// Validate a password against the strength policy
///
/// # Errors
///
/// Returns a `Validation` error naming the first unmet rule:
/// - fewer than 8 characters
/// - no uppercase letter
/// - no digit
/// - no special character
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < 8 {
        return Err(ApiError::validation(
            "Password must be at least 8 characters long",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ApiError::validation(
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ApiError::validation(
            "Password must contain at least one number",
        ));
    }
    if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        return Err(ApiError::validation(
            "Password must contain at least one special character",
        ));
    }
    Ok(())
}
