//! API error type with IntoResponse
//!
//! Every error renders as `{"message": "..."}` with the matching status.
//! Storage and auth internals are logged and hidden behind a generic 500.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dsatrack_core::ValidationError;
use serde_json::json;

use crate::auth::AuthError;
use crate::db::StoreError;

#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Body or path could not be parsed (400)
    BadRequest { message: String },

    /// Registration with an existing username (400)
    UsernameTaken,

    /// Question number already stored (400)
    NumberTaken(i32),

    /// Missing, invalid or expired token (401)
    Unauthorized,

    /// Login with unknown user or wrong password (401)
    BadCredentials,

    /// Resource not found or not owned by the caller (404)
    NotFound { resource: &'static str, id: String },

    /// Storage failure (500, logged)
    Database(StoreError),

    /// Anything else (500, logged)
    Internal { message: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::BadRequest { message } => (StatusCode::BAD_REQUEST, message.clone()),
            Self::UsernameTaken => (
                StatusCode::BAD_REQUEST,
                "Error: Username is already taken!".to_string(),
            ),
            Self::NumberTaken(number) => (
                StatusCode::BAD_REQUEST,
                format!("Error: Question number {number} already exists!"),
            ),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            Self::BadCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid username or password".to_string(),
            ),
            Self::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                format!("{resource} {id} not found"),
            ),
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "an internal error occurred".to_string(),
                )
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "an internal error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { resource, id } => Self::NotFound { resource, id },
            StoreError::UsernameTaken(_) => Self::UsernameTaken,
            StoreError::NumberTaken(number) => Self::NumberTaken(number),
            StoreError::Sqlx(_) => Self::Database(e),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        Self::Internal {
            message: e.to_string(),
        }
    }
}
