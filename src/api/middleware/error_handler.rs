//! Error handler for converting AppError to HTTP responses.
//!
//! Client errors carry their message; server errors are logged with their
//! source chain and answered with a generic body.

use axum::{
    Json,
    body::Body,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::RequestId;
use crate::api::dto::ErrorResponse;
use crate::error::AppError;

/// Upper bound on how much of a non-JSON error body is read back.
const MAX_ERROR_BODY_BYTES: usize = 16 * 1024;

impl IntoResponse for AppError {
    /// # Status Code Mapping
    /// - NotFound → 404
    /// - Validation, ValidationErrors, BadRequest → 400
    /// - Unauthorized → 401
    /// - Duplicate → 409
    /// - everything else → 500
    fn into_response(self) -> Response {
        let status = error_to_status_code(&self);
        let code = error_to_code(&self);

        let body = match &self {
            AppError::NotFound {
                entity,
                field,
                value,
            } => ErrorResponse::new(
                code,
                &format!("{} with {} {} was not found", entity, field, value),
            ),
            AppError::Duplicate {
                entity,
                field,
                value,
            } => ErrorResponse::new(
                code,
                &format!("{} with {} '{}' already exists", entity, field, value),
            )
            .with_details(json!({ "entity": entity, "field": field })),
            AppError::Validation { field, reason } => {
                ErrorResponse::new(code, reason).with_details(json!({ "field": field }))
            }
            AppError::ValidationErrors { errors } => {
                ErrorResponse::new(code, "One or more validation errors occurred.")
                    .with_details(json!({ "errors": errors }))
            }
            AppError::BadRequest { message } | AppError::Unauthorized { message } => {
                ErrorResponse::new(code, message)
            }
            AppError::ConcurrencyConflict { .. }
            | AppError::Database { .. }
            | AppError::Configuration { .. }
            | AppError::ConnectionPool { .. }
            | AppError::Internal { .. } => {
                tracing::error!(error = ?self, "Request failed with an internal error");
                ErrorResponse::new(code, "An unexpected error occurred.")
            }
        };

        if status.is_client_error() {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        (status, Json(body)).into_response()
    }
}

/// Maps an AppError variant to its corresponding HTTP status code.
pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error {
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Validation { .. }
        | AppError::ValidationErrors { .. }
        | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        AppError::Duplicate { .. } => StatusCode::CONFLICT,
        AppError::ConcurrencyConflict { .. }
        | AppError::Database { .. }
        | AppError::Configuration { .. }
        | AppError::ConnectionPool { .. }
        | AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps an AppError variant to its error code string.
pub fn error_to_code(error: &AppError) -> &'static str {
    match error {
        AppError::NotFound { .. } => "NOT_FOUND",
        AppError::Duplicate { .. } => "DUPLICATE_ENTRY",
        AppError::Validation { .. } | AppError::ValidationErrors { .. } => "VALIDATION_ERROR",
        AppError::BadRequest { .. } => "BAD_REQUEST",
        AppError::Unauthorized { .. } => "UNAUTHORIZED",
        _ => "INTERNAL_ERROR",
    }
}

/// Rewrites error responses that did not come from `AppError` (router
/// fallbacks, extractor rejections, caught panics) into [`ErrorResponse`].
///
/// JSON error bodies pass through untouched. Server error bodies are never
/// echoed back to the client.
pub async fn global_error_handler(request: Request, next: Next) -> Response {
    let request_id = request.extensions().get::<RequestId>().cloned();
    let response = next.run(request).await;
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error()) || is_json(&response) {
        return response;
    }

    let (parts, body) = response.into_parts();
    let original = axum::body::to_bytes(body, MAX_ERROR_BODY_BYTES)
        .await
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .unwrap_or_default();

    let message = if status.is_server_error() || original.is_empty() {
        default_message(status).to_string()
    } else {
        original
    };
    let code = status
        .canonical_reason()
        .unwrap_or("Error")
        .to_uppercase()
        .replace(' ', "_");

    let mut body = ErrorResponse::new(&code, &message);
    if let Some(RequestId(id)) = &request_id {
        body = body.with_request_id(id);
    }

    let mut rewritten = (status, Json(body)).into_response();
    for (name, value) in parts.headers.iter() {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            rewritten.headers_mut().insert(name.clone(), value.clone());
        }
    }
    rewritten
}

fn is_json(response: &Response<Body>) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}

fn default_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::NOT_FOUND => "The requested resource was not found",
        StatusCode::METHOD_NOT_ALLOWED => "HTTP method not allowed for this endpoint",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "Unsupported media type",
        StatusCode::PAYLOAD_TOO_LARGE => "Request payload too large",
        StatusCode::BAD_REQUEST => "Bad request - invalid or malformed request",
        s if s.is_server_error() => "An unexpected error occurred.",
        _ => "The request could not be processed",
    }
}
