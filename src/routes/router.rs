/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route groups into a single Axum router.
 *
 * # Route Groups
 *
 * 1. Public routes (auth, catalog browsing) - no token required
 * 2. Account routes (/api/me, recipe authoring, comments, votes) -
 *    bearer token required, enforced by the auth middleware
 * 3. Admin routes (/api/admin) - bearer token plus capability checks
 *    inside the handlers
 *
 * A CORS layer scoped to the configured frontend origin and a JSON 404
 * fallback wrap the whole router.
 */

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::admin::{admin_delete, admin_list_users, admin_update};
use crate::auth::handlers::{
    change_password, confirm_change_code, delete_account, forgot_password, get_profile, login,
    my_recipes, register, reset_password, send_change_code, send_code, update_profile,
    verify_code,
};
use crate::catalog::handlers as catalog;
use crate::middleware::auth_middleware;
use crate::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Route Details
///
/// ## Public
///
/// - `POST /api/auth/send-code` - Issue a registration code
/// - `POST /api/auth/verify-code` - Check a code
/// - `POST /api/auth/register` - Create an account
/// - `POST /api/auth/login` - Authenticate
/// - `POST /api/auth/forgot-password` - Issue a recovery code
/// - `POST /api/auth/reset-password` - Set a new password via code
/// - `GET /api/dishes`, `GET /api/dishes/{id}` - Browse the catalog
/// - `GET /api/categories`, `GET /api/areas` - Filter values
/// - `GET /api/recipes`, `GET /api/recipes/{id}` - Browse recipes
///
/// ## Authenticated
///
/// - `GET/PUT /api/me`, `POST /api/me/change-password`
/// - `GET /api/me/recipes`, `POST /api/me/delete-account`
/// - `POST /api/me/send-change-code`, `POST /api/me/confirm-change-code`
/// - `POST /api/recipes`, `PUT/DELETE /api/recipes/{id}`
/// - `POST /api/recipes/{id}/comments`
/// - `POST/DELETE /api/recipes/{id}/vote`
///
/// ## Admin
///
/// - `GET /api/admin/users`
/// - `PUT/DELETE /api/admin/users/{id}`
pub fn create_router(app_state: AppState) -> Router<()> {
    let public = Router::new()
        .route("/api/auth/send-code", post(send_code))
        .route("/api/auth/verify-code", post(verify_code))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/reset-password", post(reset_password))
        .route("/api/dishes", get(catalog::list_dishes))
        .route("/api/dishes/{id}", get(catalog::get_dish))
        .route("/api/categories", get(catalog::list_categories))
        .route("/api/areas", get(catalog::list_areas))
        .route("/api/recipes", get(catalog::list_recipes))
        .route("/api/recipes/{id}", get(catalog::get_recipe));

    let account = Router::new()
        .route("/api/me", get(get_profile).put(update_profile))
        .route("/api/me/change-password", post(change_password))
        .route("/api/me/recipes", get(my_recipes))
        .route("/api/me/delete-account", post(delete_account))
        .route("/api/me/send-change-code", post(send_change_code))
        .route("/api/me/confirm-change-code", post(confirm_change_code))
        .route("/api/recipes", post(catalog::create_recipe))
        .route(
            "/api/recipes/{id}",
            put(catalog::update_recipe).delete(catalog::delete_recipe),
        )
        .route("/api/recipes/{id}/comments", post(catalog::create_comment))
        .route(
            "/api/recipes/{id}/vote",
            post(catalog::vote).delete(catalog::unvote),
        );

    let admin = Router::new()
        .route("/api/admin/users", get(admin_list_users))
        .route(
            "/api/admin/users/{id}",
            put(admin_update).delete(admin_delete),
        );

    let protected = account
        .merge(admin)
        .layer(from_fn_with_state(app_state.clone(), auth_middleware));

    let cors = cors_layer(&app_state.config.cors_origin);

    public
        .merge(protected)
        .layer(cors)
        .fallback(fallback)
        .with_state(app_state)
}

/// CORS scoped to the configured frontend origin
///
/// The token travels in the Authorization header, so the origin must be
/// explicit rather than a wildcard.
fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match origin.parse::<HeaderValue>() {
        Ok(value) => cors.allow_origin(value),
        Err(_) => {
            tracing::warn!("invalid CORS_ORIGIN {:?}, cross-origin requests disabled", origin);
            cors
        }
    }
}

async fn fallback() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({"error": "Not found"})))
}
