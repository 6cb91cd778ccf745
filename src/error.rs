use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

/// Every failure a flow can surface to a caller. Handlers map collaborator
/// errors into one of these at the boundary; nothing propagates raw.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("username or email already taken")]
    DuplicateUser,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token expired")]
    Unauthorized,
    #[error("invalid token")]
    InvalidToken,
    #[error("reset token expired")]
    TokenExpired,
    #[error("email not found")]
    EmailNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation => ApiError::DuplicateUser,
            StoreError::Other(e) => ApiError::Internal(e),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateUser => StatusCode::CONFLICT,
            ApiError::InvalidCredentials
            | ApiError::Unauthorized
            | ApiError::InvalidToken
            | ApiError::TokenExpired => StatusCode::UNAUTHORIZED,
            ApiError::EmailNotFound | ApiError::UserNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Full detail stays server-side; the caller only ever sees the
        // generic message carried by the variant.
        if let ApiError::Internal(err) = &self {
            error!(error = ?err, "internal error");
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
