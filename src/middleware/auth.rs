/**
 * Authentication Middleware
 *
 * This module provides middleware for protecting routes that require user
 * authentication. It extracts and verifies JWT tokens from the
 * Authorization header and attaches a `Principal` to the request.
 *
 * The principal's role is read from the database on every request rather
 * than from the token, so a role change or account deletion takes effect
 * immediately.
 */

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::sessions::verify_token;
use crate::auth::users::{get_user_by_id, Capability, Role};
use crate::error::ApiError;
use crate::server::state::AppState;

/// Authenticated identity derived from a verified session token
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
}

/// Check that a principal holds a capability
///
/// The single choke point for role-based authorization; handlers name the
/// capability they need instead of comparing role values.
pub fn require(principal: &Principal, capability: Capability) -> Result<(), ApiError> {
    if principal.role.can(capability) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Admin access required"))
    }
}

/// Authentication middleware
///
/// This middleware:
/// 1. Extracts the JWT token from the Authorization header
/// 2. Verifies the token signature and expiry
/// 3. Confirms the user still exists and reads its current role
/// 4. Attaches a `Principal` to request extensions for handlers
///
/// Returns 401 Unauthorized when the token is missing or invalid.
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Missing Authorization header");
            ApiError::Unauthorized
        })?;

    // Format: "Bearer <token>"
    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::warn!("Invalid Authorization header format");
        ApiError::Unauthorized
    })?;

    let claims = verify_token(token).map_err(|e| {
        tracing::warn!("Invalid token: {:?}", e);
        ApiError::Unauthorized
    })?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|e| {
        tracing::warn!("Invalid user ID in token: {:?}", e);
        ApiError::Unauthorized
    })?;

    // The account must still exist; deleted users carry valid tokens
    // until expiry otherwise.
    let user = get_user_by_id(&app_state.pool, user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    request.extensions_mut().insert(Principal {
        user_id: user.id,
        role: user.role,
    });

    Ok(next.run(request).await)
}

/// Axum extractor for the authenticated principal
///
/// Used as a handler parameter on routes behind `auth_middleware`.
#[derive(Clone, Debug)]
pub struct AuthUser(pub Principal);

impl axum::extract::FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("Principal not found in request extensions");
                ApiError::Unauthorized
            })?;

        Ok(AuthUser(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_allows_capable_role() {
        let principal = Principal {
            user_id: Uuid::new_v4(),
            role: Role::Admin,
        };
        assert!(require(&principal, Capability::ModerateUsers).is_ok());
    }

    #[test]
    fn test_require_rejects_missing_capability() {
        let principal = Principal {
            user_id: Uuid::new_v4(),
            role: Role::User,
        };
        let err = require(&principal, Capability::ModerateUsers).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_require_admin_cannot_assign_roles() {
        let principal = Principal {
            user_id: Uuid::new_v4(),
            role: Role::Admin,
        };
        assert!(require(&principal, Capability::AssignRoles).is_err());
    }
}
