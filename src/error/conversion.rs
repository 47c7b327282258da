/**
 * Error Conversion
 *
 * This module provides the `IntoResponse` implementation for `ApiError`,
 * allowing handlers to return it directly.
 *
 * # Response Format
 *
 * Error responses are returned as JSON:
 * ```json
 * {
 *   "error": "Error message"
 * }
 * ```
 *
 * Internal errors are logged with their full details before the generic
 * response body is built.
 */

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::error::types::ApiError;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.is_internal() {
            tracing::error!("request failed: {self:?}");
        } else {
            tracing::debug!("request rejected: {self}");
        }

        let status = self.status_code();
        let body = serde_json::json!({ "error": self.message() });

        (status, Json(body)).into_response()
    }
}
