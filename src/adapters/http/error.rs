use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use tracing::error;

use crate::application::dto::ErrorResponse;
use crate::domain::errors::DomainError;

/// HTTP face of a failed request: status plus `{"detail": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self { status, detail: detail.into() }
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Unauthorized => Self::new(StatusCode::UNAUTHORIZED, "Unauthorized"),
            DomainError::InvalidImage(msg) => Self::new(StatusCode::BAD_REQUEST, format!("invalid image: {msg}")),
            DomainError::InvalidInput(msg) => Self::unprocessable(msg),
            DomainError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, msg),
            DomainError::OperationFailed(msg) => {
                error!("predict failed: {msg}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { detail: self.detail })).into_response()
    }
}
