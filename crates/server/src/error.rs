use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{
    identity::IdentityError,
    projects::{ProjectServiceError, ValidationError},
};
use thiserror::Error;
use utils::response::{ErrorCode, ErrorResponse};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Project(#[from] ProjectServiceError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("malformed body: {0}")]
    MalformedBody(#[from] JsonRejection),
    #[error("write attempted without a known caller")]
    Forbidden,
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Project(err.into())
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            ApiError::Project(ProjectServiceError::Validation(v)) => {
                (StatusCode::BAD_REQUEST, v.code())
            }
            ApiError::Project(ProjectServiceError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, ErrorCode::NotFound)
            }
            ApiError::MalformedBody(_) => (StatusCode::BAD_REQUEST, ErrorCode::MalformedBody),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, ErrorCode::Forbidden),
            ApiError::Project(ProjectServiceError::Database(_))
            | ApiError::Identity(_)
            | ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Internal),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Store failures keep their detail in the log only.
        let body = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            ErrorResponse::from(code)
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
            match &self {
                ApiError::MalformedBody(rejection) => {
                    ErrorResponse::new(code, rejection.body_text())
                }
                _ => ErrorResponse::from(code),
            }
        };

        (status, Json(body)).into_response()
    }
}
