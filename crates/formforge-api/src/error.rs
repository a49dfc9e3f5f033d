//! HTTP mapping of engine errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use formforge_core::FormsError;
use thiserror::Error;

use crate::models::{ApiResponse, ErrorResponse};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] FormsError),

    /// No usable caller identity on an owner-scoped route
    #[error("missing or invalid caller identity")]
    Unauthenticated,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            Self::Engine(err) => match err {
                FormsError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
                FormsError::Unauthorized(_) => (StatusCode::FORBIDDEN, "forbidden"),
                FormsError::Duplicate { .. } => (StatusCode::CONFLICT, "duplicate"),
                FormsError::StateConflict(_) => (StatusCode::CONFLICT, "state_conflict"),
                FormsError::ValidationFailed { .. } => (StatusCode::BAD_REQUEST, "validation_failed"),
                FormsError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
                FormsError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let (message, errors) = match self {
            Self::Engine(FormsError::ValidationFailed { message, errors }) => (message, Some(errors)),
            Self::Engine(FormsError::Internal(detail)) => {
                tracing::error!(error = %detail, "request failed");
                ("internal server error".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(ErrorResponse { code: code.to_string(), message, errors }),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (FormsError::not_found("form", 1), StatusCode::NOT_FOUND),
            (FormsError::Unauthorized("form"), StatusCode::FORBIDDEN),
            (FormsError::StateConflict("published".into()), StatusCode::CONFLICT),
            (FormsError::validation("Validation failed", BTreeMap::new()), StatusCode::BAD_REQUEST),
            (FormsError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (FormsError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
        assert_eq!(
            ApiError::Unauthenticated.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
