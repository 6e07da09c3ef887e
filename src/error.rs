//! API error taxonomy shared by all handlers.
//!
//! Every failure surfaced to a client maps onto one of these kinds; raw
//! storage errors never leave the process.

use crate::db::DbError;
use crate::validate::FieldError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    /// One or more fields failed validation. Reported all at once.
    Validation(Vec<FieldError>),
    /// The email is already registered (users or stores).
    DuplicateEmail,
    /// Unknown email or wrong password. Indistinguishable on purpose.
    InvalidCredentials,
    /// Missing, malformed, or expired bearer token.
    Unauthenticated(&'static str),
    /// Authenticated, but the role does not match the gate.
    Forbidden,
    NotFound(&'static str),
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::DuplicateEmail => ApiError::DuplicateEmail,
            other => ApiError::Internal(other.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            ApiError::DuplicateEmail => {
                error_response(StatusCode::BAD_REQUEST, "Email already exists")
            }
            ApiError::InvalidCredentials => {
                error_response(StatusCode::UNAUTHORIZED, "Invalid credentials")
            }
            ApiError::Unauthenticated(message) => {
                error_response(StatusCode::UNAUTHORIZED, message)
            }
            ApiError::Forbidden => error_response(StatusCode::FORBIDDEN, "Insufficient permissions"),
            ApiError::NotFound(what) => error_response(StatusCode::NOT_FOUND, what),
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {:#}", err);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let body = Json(json!({
        "error": message,
    }));

    (status, body).into_response()
}
