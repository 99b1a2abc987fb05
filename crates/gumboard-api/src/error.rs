use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use gumboard_types::api::{ErrorBody, FieldError};

pub type ApiResult<T> = Result<T, ApiError>;

/// Every failure a handler can surface. Anything unexpected ends up in
/// `Internal`, which is logged in full and reported with a generic message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("User is not a member of any organization")]
    NoOrganization,

    #[error("Access denied")]
    AccessDenied,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{missing} of {requested} notes not found")]
    SomeNotFound { requested: usize, missing: usize },

    #[error("Request validation failed")]
    ValidationFailed(Vec<FieldError>),

    #[error("Expected {expected} items, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Stale version; current version is {current}")]
    VersionConflict { current: i64 },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::ValidationFailed(vec![FieldError {
            field: field.to_string(),
            message: message.into(),
        }])
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::NoOrganization | Self::AccessDenied => StatusCode::FORBIDDEN,
            Self::NotFound(_) | Self::SomeNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ValidationFailed(_) | Self::CountMismatch { .. } => StatusCode::BAD_REQUEST,
            Self::VersionConflict { .. } => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::NoOrganization => "NO_ORGANIZATION",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::SomeNotFound { .. } => "SOME_NOT_FOUND",
            Self::ValidationFailed(_) => "VALIDATION_FAILED",
            Self::CountMismatch { .. } => "COUNT_MISMATCH",
            Self::VersionConflict { .. } => "VERSION_CONFLICT",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = match &self {
            Self::Internal(e) => {
                error!("Internal error: {:#}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let details = match self {
            Self::ValidationFailed(details) => details,
            _ => vec![],
        };

        let body = ErrorBody {
            error: code.to_string(),
            message,
            details,
        };
        (status, Json(body)).into_response()
    }
}
