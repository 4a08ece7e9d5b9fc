use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use yatube_auth::AuthzError;
use yatube_core::{DomainError, FieldErrors};
use yatube_infra::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of a single resource operation.
///
/// Every variant is terminal for the request and maps to exactly one HTTP
/// status in [`IntoResponse`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("invalid payload: {0}")]
    Validation(FieldErrors),

    /// A bearer token was sent but could not be verified.
    #[error("invalid or expired credentials")]
    NotAuthenticated,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(fields) => ApiError::Validation(fields),
            DomainError::InvalidId(msg) => ApiError::validation(FieldErrors::NON_FIELD, msg),
            DomainError::NotFound(what) => ApiError::NotFound(what),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        ApiError::PermissionDenied(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::NotFound(what),
            StoreError::Conflict(msg) => ApiError::validation(FieldErrors::NON_FIELD, msg),
            StoreError::MissingReference { field } => {
                ApiError::validation(field, "Invalid pk - object does not exist.")
            }
            StoreError::Backend(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(FieldErrors::NON_FIELD, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(what) => {
                json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
            }
            ApiError::PermissionDenied(msg) => json_error(StatusCode::FORBIDDEN, "permission_denied", msg),
            ApiError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                axum::Json(json!({
                    "error": "validation_error",
                    "message": "invalid payload",
                    "fields": fields,
                })),
            )
                .into_response(),
            ApiError::NotAuthenticated => json_error(
                StatusCode::UNAUTHORIZED,
                "not_authenticated",
                "invalid or expired credentials",
            ),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal server error")
            }
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
