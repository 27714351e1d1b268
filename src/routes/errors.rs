use actix_web::{error, http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use std::fmt;

use crate::models::ErrorResponse;
use crate::services::SupabaseError;

/// Error returned by handlers, rendered as an `ErrorResponse` body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse::new(error, message, status.as_u16()),
        }
    }

    pub fn bad_request(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error, message)
    }

    pub fn validation(errors: validator::ValidationErrors) -> Self {
        Self::bad_request("Validation failed", errors.to_string())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", message)
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        let error = error.into();
        Self::new(StatusCode::NOT_FOUND, error.clone(), error)
    }

    pub fn internal(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error, message)
    }

    pub fn body(&self) -> &ErrorResponse {
        &self.body
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.body.error, self.body.message)
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(&self.body)
    }
}

/// Log a backing-store failure and turn it into a 500
pub fn storage_failure(context: &str, err: SupabaseError) -> ApiError {
    tracing::error!("{}: {}", context, err);
    let error = match &err {
        SupabaseError::Api { message, .. } => message.clone(),
        _ => context.to_string(),
    };
    ApiError::internal(error, err.to_string())
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError::bad_request("invalid_json", format!("Invalid JSON: {}", err)).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::bad_request("invalid_query", format!("Invalid query: {}", err)).into()
}

/// Handle path parameters that do not parse, e.g. a malformed id
pub fn handle_path_error(err: error::PathError, req: &HttpRequest) -> actix_web::Error {
    tracing::debug!("Unparseable path {}: {}", req.path(), err);
    ApiError::new(StatusCode::NOT_FOUND, "Not found", format!("Invalid path parameter: {}", err)).into()
}
